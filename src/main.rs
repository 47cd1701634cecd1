mod config;
mod games;
mod input;
mod logging;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use tracing::{debug, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use config::{GameConfig, SoundConfig};
use games::escape::session::SoundCue;
use games::escape::{EscapeGame, TICK_MS};
use games::Game;
use input::{pixel_x_to_col, pixel_y_to_row, pointer_events, Arrow, ClickState, InputEvent, PointerPhase};
use time::GameTime;

/// Convert page pixel coordinates to a terminal cell using the grid container's rect.
fn dom_pixel_to_cell(page_x: f64, page_y: f64, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let col = pixel_x_to_col(page_x - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(page_y - rect.top(), rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

/// Resolve a pointer sample against the last frame's targets and feed the
/// resulting events to the game. Returns true when it landed on a target.
fn dispatch_pointer(
    game: &RefCell<EscapeGame>,
    click_state: &RefCell<ClickState>,
    phase: PointerPhase,
    x: f64,
    y: f64,
) -> bool {
    let cs = click_state.borrow();
    if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
        return false;
    }
    let hit = dom_pixel_to_cell(x, y, &cs).and_then(|(col, row)| cs.hit_test_local(col, row));
    drop(cs);

    let mut game = game.borrow_mut();
    for event in pointer_events(phase, hit) {
        if let InputEvent::Click(action_id) = event {
            debug!(action_id, "click");
        }
        game.handle_input(&event);
    }
    hit.is_some()
}

/// ratzilla only forwards mouse events, and browsers send no `mousemove`
/// during a touch drag. Touches are listened for on the document instead.
fn listen_for_touch(game: &Rc<RefCell<EscapeGame>>, click_state: &Rc<RefCell<ClickState>>) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    // Non-passive so a touch on a target can suppress scrolling and the
    // emulated mouse click that would follow it.
    let options = web_sys::AddEventListenerOptions::new();
    options.set_passive(false);

    for kind in ["touchstart", "touchmove", "touchend", "touchcancel"] {
        let Some(phase) = PointerPhase::from_touch(kind) else {
            continue;
        };
        let game = game.clone();
        let click_state = click_state.clone();
        let closure = Closure::wrap(Box::new(move |evt: web_sys::TouchEvent| {
            let Some(touch) = evt.changed_touches().get(0) else {
                return;
            };
            let (x, y) = (touch.client_x() as f64, touch.client_y() as f64);
            if dispatch_pointer(&game, &click_state, phase, x, y) {
                evt.prevent_default();
            }
        }) as Box<dyn FnMut(web_sys::TouchEvent)>);
        document.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        closure.forget();
    }
    Ok(())
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn play(cue: SoundCue, sound: &SoundConfig) {
    if !sound.enabled {
        return;
    }
    let audio = match web_sys::HtmlAudioElement::new_with_src(cue.asset()) {
        Ok(audio) => audio,
        Err(e) => {
            warn!(?cue, error = ?e, "audio element unavailable");
            return;
        }
    };
    audio.set_volume(sound.volume);
    if let Err(e) = audio.play() {
        warn!(?cue, error = ?e, "sound playback rejected");
    }
}

fn key_to_input(code: KeyCode) -> Option<InputEvent> {
    Some(match code {
        KeyCode::Char(c) => InputEvent::Key(c),
        KeyCode::Up => InputEvent::Arrow(Arrow::Up),
        KeyCode::Down => InputEvent::Arrow(Arrow::Down),
        KeyCode::Left => InputEvent::Arrow(Arrow::Left),
        KeyCode::Right => InputEvent::Arrow(Arrow::Right),
        KeyCode::Enter => InputEvent::Enter,
        KeyCode::Backspace => InputEvent::Backspace,
        KeyCode::Esc => InputEvent::Escape,
        _ => return None,
    })
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let (config, config_problem) = GameConfig::load();
    if !logging::init(&config.log_filter) {
        warn!(filter = %config.log_filter, "log filter rejected, using info");
    }
    if let Some(problem) = config_problem {
        warn!("{problem}");
    }

    let seed = (js_sys::Math::random() * u32::MAX as f64) as u64
        ^ (((js_sys::Math::random() * u32::MAX as f64) as u64) << 32);
    info!(start = config.start_room.as_str(), minutes = config.countdown_minutes, "starting");

    let sound = config.sound.clone();
    let game = Rc::new(RefCell::new(EscapeGame::new(config, seed)));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse: clicks resolve to action ids, drags stream as pointer events.
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            let phase = match mouse_event.event {
                MouseEventKind::Pressed if mouse_event.button == MouseButton::Left => PointerPhase::Down,
                MouseEventKind::Moved => PointerPhase::Move,
                MouseEventKind::Released => PointerPhase::Up,
                _ => return,
            };
            dispatch_pointer(&game, &click_state, phase, mouse_event.x as f64, mouse_event.y as f64);
        }
    });

    if let Err(e) = listen_for_touch(&game, &click_state) {
        warn!(error = ?e, "touch input unavailable");
    }

    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let Some(event) = key_to_input(key_event.code) {
                game.borrow_mut().handle_input(&event);
            }
        }
    });

    let mut clock = GameTime::new(TICK_MS);
    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let ticks = clock.update(now_ms());
            let mut game = game.borrow_mut();
            if ticks > 0 {
                game.tick(ticks);
            }
            for cue in game.drain_sounds() {
                play(cue, &sound);
            }

            let size = f.area();
            {
                let mut cs = click_state.borrow_mut();
                cs.terminal_cols = size.width;
                cs.terminal_rows = size.height;
                cs.clear_targets();
            }
            game.render(f, size, &click_state);
        }
    });

    Ok(())
}
