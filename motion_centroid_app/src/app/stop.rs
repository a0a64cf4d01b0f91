use std::io::{BufRead, BufReader};

use crossbeam_channel::{Receiver, TryRecvError};
use motion_centroid::StopSignal;

use crate::app::*;

// Ends the run when the user types "q" then enter, or after a fixed number of frames.
#[derive(Debug)]
pub struct AppStop {
    keypress: Option<Receiver<()>>,
    max_frames: Option<u64>,
    polls: u64,
}

impl AppStop {
    pub fn new(cfg: &StopCfg) -> Self {
        let keypress = cfg.keypress.then(|| spawn_stdin_watcher(BufReader::new(std::io::stdin())));
        Self::with_receiver(keypress, cfg.max_frames)
    }

    fn with_receiver(keypress: Option<Receiver<()>>, max_frames: Option<u64>) -> Self {
        Self {
            keypress,
            max_frames,
            polls: 0,
        }
    }
}

impl StopSignal for AppStop {
    fn stop_requested(&mut self) -> bool {
        //polled once per frame read.
        self.polls += 1;
        if self.max_frames.is_some_and(|max| self.polls >= max) {
            info!("Stopping after {} frames", self.polls);
            return true;
        }

        match &self.keypress {
            None => false,
            Some(rx) => match rx.try_recv() {
                Ok(()) => {
                    info!("Stop requested");
                    true
                }
                Err(TryRecvError::Empty) => false,

                //stdin closed. Keep running until the source ends.
                Err(TryRecvError::Disconnected) => {
                    self.keypress = None;
                    false
                }
            },
        }
    }
}

// Watch for a line consisting of "q" on the given input, on a background thread.
fn spawn_stdin_watcher<R>(input: R) -> Receiver<()>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);

    std::thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim().eq_ignore_ascii_case("q") {
                let _ = tx.send(());
                break;
            }
        }
    });

    rx
}
