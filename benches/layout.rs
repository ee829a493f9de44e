use criterion::{black_box, criterion_group, criterion_main, Criterion};
use floating_callout::callout::{
    compute_layout, AttachmentSpec, Point, Rect, Side, Size, StyleParameters,
};

fn request(side: Side) -> AttachmentSpec {
    AttachmentSpec {
        side,
        screen_rect: Some(Rect::new(0.0, 0.0, 1920.0, 1080.0)),
        ..AttachmentSpec::new(Size::new(240.0, 120.0), Point::new(1800.0, 40.0))
    }
}

fn bench_layout(c: &mut Criterion) {
    let style = StyleParameters::default();
    let explicit = request(Side::Bottom);
    let automatic = request(Side::Automatic);

    c.bench_function("layout_explicit_side", |b| {
        b.iter(|| compute_layout(black_box(&explicit), black_box(&style)))
    });
    c.bench_function("layout_automatic_side", |b| {
        b.iter(|| compute_layout(black_box(&automatic), black_box(&style)))
    });
    c.bench_function("outline_flatten", |b| {
        let layout = compute_layout(&explicit, &style).expect("layout");
        b.iter(|| black_box(&layout.outline).flatten())
    });
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
