//! Terminal rendition of the score gauge

use colored::{ColoredString, Colorize};
use scoreguard_core::config::AnimationSettings;
use scoreguard_core::{GaugeView, ScoreResult, ScoreTier, SystemClock, VisualState};
use std::io::Write;
use std::sync::Arc;

const BAR_WIDTH: usize = 40;

/// How an animated run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Settled,
    Interrupted,
}

fn rgb(tier: ScoreTier) -> (u8, u8, u8) {
    let hex = tier.hex_color().trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(0)
    };
    (channel(0), channel(2), channel(4))
}

pub fn paint(text: &str, tier: ScoreTier) -> ColoredString {
    let (r, g, b) = rgb(tier);
    text.truecolor(r, g, b)
}

/// One line: `[#####.....]  742  Good`
pub fn line(state: &VisualState) -> String {
    let filled = ((state.percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let bar = format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled)
    );
    format!(
        "[{}] {:>4}  {}",
        paint(&bar, state.color),
        state.displayed_count,
        paint(state.color.category(), state.color).bold()
    )
}

fn draw(state: &VisualState) {
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "\r{}", line(state));
    let _ = stdout.flush();
}

/// Animate the gauge until it settles or Ctrl-C unmounts it
pub async fn render(result: &ScoreResult, settings: &AnimationSettings, animate: bool) -> Outcome {
    let mut view = GaugeView::new(Arc::new(SystemClock::new()), *settings);
    view.show(result.clone());

    if !animate {
        if let Some(state) = view.finish() {
            draw(&state);
        }
        println!();
        return Outcome::Settled;
    }

    let mut ticker = tokio::time::interval(settings.frame_interval());
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match view.frame() {
                    Some(state) => draw(&state),
                    None => break,
                }
                if !view.is_animating() {
                    break;
                }
            }
            _ = &mut interrupt => {
                view.unmount();
                println!();
                tracing::debug!("Gauge unmounted by interrupt");
                return Outcome::Interrupted;
            }
        }
    }

    println!();
    Outcome::Settled
}
