use criterion::{Criterion, black_box, criterion_group, criterion_main};

use keyviz::keyboard::code::{KeyIdentifier, resolve};
use keyviz::keyboard::highlight::HighlightTracker;
use keyviz::protocol::{self, SurfaceCommand};

const CODES: &[&str] = &[
    "KeyA", "KeyZ", "Digit7", "ArrowLeft", "F11", "ShiftLeft", "AltRight", "Backslash",
    "Slash", "NumpadEnter", "Space", "CapsLock",
];

fn bench_resolve(c: &mut Criterion) {
    c.bench_function("resolve (12 codes)", |b| {
        b.iter(|| {
            for code in CODES {
                black_box(resolve(black_box(code)));
            }
        })
    });
}

fn bench_tracker(c: &mut Criterion) {
    c.bench_function("tracker down/repeat/up (12 codes)", |b| {
        b.iter(|| {
            let mut tracker = HighlightTracker::new();
            for code in CODES {
                black_box(tracker.key_down(code, false));
                black_box(tracker.key_down(code, false));
            }
            for code in CODES {
                black_box(tracker.key_up(code));
            }
        })
    });
}

fn bench_channel(c: &mut Criterion) {
    let (controller, surface) = protocol::channel();
    let command = SurfaceCommand::KeyDown {
        key_identifier: KeyIdentifier::new("a"),
    };

    c.bench_function("envelope post + drain (100 messages)", |b| {
        b.iter(|| {
            for _ in 0..100 {
                controller.post(black_box(&command));
            }
            black_box(surface.drain())
        })
    });
}

criterion_group!(benches, bench_resolve, bench_tracker, bench_channel);
criterion_main!(benches);
