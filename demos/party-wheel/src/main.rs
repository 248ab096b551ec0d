use std::time::Duration;

use serde::Serialize;
use spinwheel::prelude::*;

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// The crew list the wheel spins over. Only mutated by eliminations.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct Roster {
    names: Vec<String>,
}

impl Roster {
    fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { names: names.into_iter().map(Into::into).collect() }
    }

    fn len(&self) -> usize {
        self.names.len()
    }

    fn request(&self) -> SpinRequest {
        SpinRequest::new(self.names.iter().cloned())
    }

    /// Removes the eliminated entry: by index when the name there still
    /// matches, otherwise the first entry with that name.
    fn eliminate(&mut self, elim: &Elimination) -> bool {
        let at = match self.names.get(elim.index) {
            Some(name) if *name == elim.name => Some(elim.index),
            _ => self.names.iter().position(|n| *n == elim.name),
        };
        match at {
            Some(i) => {
                self.names.remove(i);
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Short timings so a demo round takes seconds, not half a minute.
fn demo_config() -> WheelConfig {
    WheelConfig {
        spin_duration: Duration::from_secs(2),
        settle_padding: Duration::from_millis(200),
        countdown_seed: 3,
        eject_duration: Duration::from_secs(1),
        float_duration: Duration::from_secs(1),
        ..WheelConfig::default()
    }
}

fn load_config() -> Result<WheelConfig, SpinwheelError> {
    match std::env::var("SPINWHEEL_CONFIG") {
        Ok(path) => spinwheel::load_config(path),
        Err(_) => Ok(demo_config()),
    }
}

// ---------------------------------------------------------------------------
// Rounds
// ---------------------------------------------------------------------------

/// Runs one spin to completion and applies the elimination to `roster`.
async fn play_round(
    wheel: &PhaseController,
    events: &mut EventReceiver,
    roster: &mut Roster,
) -> Result<(), SpinwheelError> {
    wheel.start(roster.request()).await?;

    while let Some(event) = events.recv().await {
        match event {
            WheelEvent::Announce(text) => println!(">> {text}"),
            WheelEvent::PhaseChanged(Phase::Revealed) => {
                if let Some(line) = wheel.current().roast_line {
                    println!("   {line}");
                }
                let mut watch = wheel.watch();
                watch
                    .wait_for(|snap| snap.can_confirm)
                    .await
                    .map_err(|_| PhaseError::Unavailable)?;
                wheel.confirm().await?;
            }
            WheelEvent::PhaseChanged(phase) => tracing::debug!(%phase, "phase changed"),
            WheelEvent::Eliminated(elim) => {
                if !roster.eliminate(&elim) {
                    tracing::warn!(name = %elim.name, "eliminated name not on roster");
                }
            }
            WheelEvent::Closed => return Ok(()),
        }
    }
    Err(PhaseError::Unavailable.into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    spinwheel::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut roster = if args.is_empty() {
        Roster::new(["Alice", "Bob", "Carol", "Dave"])
    } else {
        Roster::new(args)
    };

    let (wheel, mut events) = Spinwheel::builder().config(load_config()?).spawn();

    while roster.len() > 1 {
        play_round(&wheel, &mut events, &mut roster).await?;
        println!("crew left: {}", serde_json::to_string(&roster)?);
        wheel.open().await?;
    }

    wheel.shutdown().await?;
    if let Some(survivor) = roster.names.first() {
        println!("{survivor} survives the meeting");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elim(name: &str, index: usize) -> Elimination {
        Elimination { name: name.into(), index }
    }

    #[test]
    fn test_eliminate_by_index() {
        let mut roster = Roster::new(["Sam", "Ann", "Sam"]);
        assert!(roster.eliminate(&elim("Sam", 2)));
        assert_eq!(roster.names, vec!["Sam", "Ann"]);
    }

    #[test]
    fn test_eliminate_falls_back_to_name() {
        let mut roster = Roster::new(["Ann", "Ben", "Cy"]);
        // Index moved since the spin started.
        assert!(roster.eliminate(&elim("Cy", 0)));
        assert_eq!(roster.names, vec!["Ann", "Ben"]);
    }

    #[test]
    fn test_eliminate_unknown_name() {
        let mut roster = Roster::new(["Ann"]);
        assert!(!roster.eliminate(&elim("Zed", 0)));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_demo_config_is_short() {
        let config = demo_config();
        assert_eq!(config.countdown_seed, 3);
        assert!(config.reveal_delay() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rounds_until_one_left() {
        let mut roster = Roster::new(["Ann", "Ben", "Cy"]);
        let (wheel, mut events) = Spinwheel::builder().config(demo_config()).seed(8).spawn();

        while roster.len() > 1 {
            play_round(&wheel, &mut events, &mut roster).await.unwrap();
            wheel.open().await.unwrap();
        }
        assert_eq!(roster.len(), 1);
        wheel.shutdown().await.unwrap();
    }
}
