use std::io;
use std::rc::Rc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use log::info;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph};

use tui_proximity::layout::label_width;
use tui_proximity::terminal::{place_label, CellGlyph, CellMetrics, TerminalRegion};
use tui_proximity::widget::{ProximityLabel, VariationStyle};
use tui_proximity::{FixedInterval, FrameLoop, PointerChannel, ProximityBuilder, VariableProximity};

#[derive(Parser)]
#[command(name = "tui-proximity-harness", version)]
#[command(about = "Letters that thicken as the mouse gets close")]
struct Cli {
    /// Text to render
    #[arg(short, long, default_value = "Move the mouse across these letters")]
    label: String,

    /// Axis values at rest
    #[arg(long, default_value = "'wght' 400, 'slnt' 0")]
    from: String,

    /// Axis values under the pointer
    #[arg(long, default_value = "'wght' 900, 'slnt' -10")]
    to: String,

    /// Distance at which letters stop reacting, in cell widths
    #[arg(short, long, default_value_t = 12.0)]
    radius: f64,

    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Height of a terminal cell relative to its width
    #[arg(long, default_value_t = 2.0)]
    cell_aspect: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    enable_raw_mode()?;
    crossterm::execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    let result = run(cli);

    disable_raw_mode()?;
    crossterm::execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;

    result
}

fn run(cli: Cli) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let metrics = CellMetrics {
        width: 1.0,
        height: cli.cell_aspect,
    };
    let region = Rc::new(TerminalRegion::new(metrics));
    let pointer = PointerChannel::new();
    let mut frames = FrameLoop::new(FixedInterval::from_fps(cli.fps));
    let shading = VariationStyle::default();
    let width = label_width(&cli.label);

    let effect = ProximityBuilder::new()
        .label(cli.label)
        .class_name("harness")
        .container(region.clone())
        .from_settings(cli.from)
        .to_settings(cli.to)
        .radius(cli.radius)
        .mount(&pointer, &frames, |glyph| Some(CellGlyph::new(glyph, metrics)))?;

    info!(
        "running {:?} at {:?} per frame",
        effect.label(),
        frames.scheduler().interval()
    );

    loop {
        let timeout = frames.time_until_frame(Instant::now());

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                        break;
                    }
                }

                Event::Mouse(mouse)
                    if matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) =>
                {
                    let at = metrics.cell_center(mouse.column, mouse.row);
                    pointer.emit(at.x, at.y);
                }

                _ => {}
            }

            continue;
        }

        if frames.pump(Instant::now()) > 0 {
            terminal.draw(|f| draw(f, &effect, &region, &shading, width))?;
        }
    }

    Ok(())
}

fn draw(
    f: &mut Frame,
    effect: &VariableProximity<CellGlyph>,
    region: &TerminalRegion,
    shading: &VariationStyle,
    width: u16,
) {
    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(f.area());

    f.render_widget(
        Paragraph::new("tui-proximity  [move the mouse]  [q quit]")
            .style(Style::new().fg(Color::DarkGray)),
        chunks[0],
    );

    let block = Block::bordered().title(" variable proximity ");
    let inner = block.inner(chunks[1]);
    f.render_widget(block, chunks[1]);

    // Glyphs are measured against the region on the next frame.
    region.set_area(inner);
    effect.with_targets_mut(|glyphs| place_label(inner, width, glyphs));
    effect.with_targets(|glyphs| f.render_widget(ProximityLabel::new(glyphs, shading), inner));
}
