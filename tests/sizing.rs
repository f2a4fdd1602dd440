use haarlet::sizing::{auto_size, target_dimensions};
use haarlet::{HaarError, ProcessingSize};

#[test]
/// Auto resolves 300x500 to the largest power of two not above 300.
fn auto_resolution_example() {
    assert_eq!(auto_size(300, 500), 256);
    assert_eq!(ProcessingSize::Auto.resolve(300, 500), Ok(256));
}

#[test]
/// Auto clamps to [8, 1024].
fn auto_resolution_clamps() {
    assert_eq!(auto_size(4, 4), 8);
    assert_eq!(auto_size(1, 1), 8);
    assert_eq!(auto_size(1024, 1024), 1024);
    assert_eq!(auto_size(4096, 2048), 1024);
}

#[test]
/// Fixed sizes outside powers of two are rejected.
fn fixed_size_validation() {
    assert_eq!(ProcessingSize::Fixed(1024).resolve(1, 1), Ok(1024));
    assert_eq!(
        ProcessingSize::Fixed(0).resolve(1, 1),
        Err(HaarError::InvalidProcessingSize { size: 0 })
    );
}

#[test]
/// Resize targets keep the aspect ratio of the source.
fn resize_targets() {
    assert_eq!(target_dimensions(800, 600, 512), (512, 384));
    assert_eq!(target_dimensions(500, 300, 256), (256, 154));
}
