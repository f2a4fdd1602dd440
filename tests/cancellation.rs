use core::cell::Cell;
use std::sync::atomic::AtomicBool;

use haarlet::{Cancel, HaarError, IntensityBuffer, Session};

struct CancelAfter {
    polls: Cell<usize>,
    limit: usize,
}

impl Cancel for CancelAfter {
    fn is_cancelled(&self) -> bool {
        let n = self.polls.get();
        self.polls.set(n + 1);
        n >= self.limit
    }
}

fn source() -> IntensityBuffer {
    IntensityBuffer::from_vec(16, 16, (0..256).map(f64::from).collect()).unwrap()
}

#[test]
/// A raised flag stops the transform before the first level.
fn flag_set_before_start() {
    let session = Session::new();
    let ctx = session.prepare(source());
    let flag = AtomicBool::new(true);
    assert_eq!(
        session.run_forward_cancellable(&ctx, 3, 0.0, true, &flag),
        Err(HaarError::Cancelled {
            completed_levels: 0
        })
    );
}

#[test]
/// Cancellation is observed between levels and reports completed levels.
fn cancel_between_levels() {
    let session = Session::new();
    let ctx = session.prepare(source());
    let cancel = CancelAfter {
        polls: Cell::new(0),
        limit: 2,
    };
    assert_eq!(
        session.run_forward_cancellable(&ctx, 4, 0.0, true, &cancel),
        Err(HaarError::Cancelled {
            completed_levels: 2
        })
    );
}

#[test]
/// An untriggered token lets reconstruction finish.
fn reconstruct_with_idle_token() {
    let session = Session::new();
    let ctx = session.prepare(source());
    let fwd = session.run_forward(&ctx, 2, 0.0, true).unwrap();
    let flag = AtomicBool::new(false);
    let recon = fwd
        .coefficients
        .reconstruct_cancellable(fwd.coefficients.descriptor(), &fwd.level_sizes, &flag)
        .unwrap();
    assert_eq!((recon.width(), recon.height()), (16, 16));
}
