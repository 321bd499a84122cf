//! Chop Shift entry point
//!
//! Runs one scripted shift headlessly at a fixed frame step and prints the
//! pay slip.
//!
//! Usage: `chop-shift [settings.json] [history.json]`

use std::path::PathBuf;

use chop_shift::consts::FRAME_DT;
use chop_shift::sim::{ItemHandle, WorkState};
use chop_shift::{Shift, ShiftHistory, ShiftSettings, TickInput, tick};

/// Length of the scripted shift
const SHIFT_SECONDS: f32 = 90.0;
/// Frames between knife strokes
const CUT_EVERY_FRAMES: u64 = 6;
/// Every Nth prepped ingredient is the wrong one
const MISTAKE_EVERY: u32 = 7;
/// The bot steps away from the station this often
const BREAK_EVERY_SECONDS: f32 = 25.0;

fn main() {
    env_logger::init();
    log::info!("Chop Shift (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => ShiftSettings::load_or_default(&PathBuf::from(path)),
        None => ShiftSettings::default(),
    };
    let history_path = args.next().map(PathBuf::from);

    let mut shift = Shift::new(&settings);

    shift.show_intro();
    while shift.intro.is_open() {
        let input = TickInput {
            advance_intro: true,
            ..Default::default()
        };
        tick(&mut shift, &input, FRAME_DT);
    }

    let start = TickInput {
        start_work: true,
        ..Default::default()
    };
    tick(&mut shift, &start, FRAME_DT);

    let frames = (SHIFT_SECONDS / FRAME_DT) as u64;
    let break_frames = ((BREAK_EVERY_SECONDS / FRAME_DT) as u64).max(1);
    let mut prepped = 0u32;

    for frame in 0..frames {
        let mut input = TickInput::default();

        if shift.queue.is_empty() && shift.chopping.round().item.is_none() {
            if let Some(item) = pick_ingredient(&shift, prepped) {
                shift.prep(item);
                prepped += 1;
            }
        }

        if frame > 0 && frame % break_frames == 0 {
            input.cancel = true;
        } else if shift.session.state() == WorkState::Working {
            input.open_station = true;
        } else if frame % CUT_EVERY_FRAMES == 0 {
            input.cut = true;
        }

        tick(&mut shift, &input, FRAME_DT);
    }

    let settlement = shift.stop_work();
    println!("\n=== Shift over ===");
    println!("{}", settlement.summary());
    println!("Orders timed out: {}", shift.orders.timeouts());

    if let Some(path) = history_path {
        let mut history = ShiftHistory::load_or_default(&path);
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0);
        match history.record(settlement, timestamp) {
            Some(rank) => println!("New entry on the shift board at #{}", rank),
            None => println!("Not enough for the shift board"),
        }
        if let Err(e) = history.save_to(&path) {
            log::error!("Could not save shift history: {}", e);
        }
    }
}

/// The ingredient the current order wants, or a deliberate wrong one
fn pick_ingredient(shift: &Shift, prepped: u32) -> Option<ItemHandle> {
    let wanted = shift.orders.current()?.item.clone();
    if prepped % MISTAKE_EVERY != MISTAKE_EVERY - 1 {
        return Some(wanted);
    }
    shift
        .items()
        .iter()
        .find(|i| !i.same_as(&wanted))
        .cloned()
        .or(Some(wanted))
}
