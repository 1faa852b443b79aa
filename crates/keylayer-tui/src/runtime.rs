use anyhow::Result;
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use tracing::debug;

use crate::app::App;
use crate::render::render;
use crate::terminal::Tui;

/// Single-threaded UI loop: every handler runs to completion before the
/// next terminal event is read.
pub(crate) async fn run_app(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut event_stream = EventStream::new();

    while app.running {
        let view: &App = app;
        terminal.draw(|f| render(f, view))?;

        match event_stream.next().await {
            Some(Ok(Event::Key(key))) => app.handle_key(key)?,
            Some(Ok(Event::Resize(width, height))) => {
                debug!(width, height, "terminal resized");
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(e.into()),
            None => break,
        }
    }

    Ok(())
}
