use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wavegraph::capture::Capture;
use wavegraph::graph::{
    FrozenSamples, GraphSession, GraphSettings, MemorySurface, Mode, Viewport, WaveLength,
};

fn wait_until(mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(2));
    }
}

#[test]
fn test_capture_lifecycle() {
    let mut session = GraphSession::new(
        GraphSettings::new(WaveLength::new(8)).with_max_amplitude(4000),
    );
    let surface = MemorySurface::new(Viewport::new(400, 200));
    session.attach_to_surface(Box::new(surface.clone()));

    // Streaming: the newest sample sits at 3/4 of the width with the needle on it.
    session.on_recording_started();
    let sink = session.sample_sink();
    let producer = thread::spawn(move || {
        for (time_ms, amplitude) in [(0, 0), (150, 1000), (300, 2000)] {
            sink.push(time_ms, amplitude);
        }
    });
    producer.join().unwrap();

    wait_until(|| {
        surface
            .last_scene()
            .is_some_and(|scene| scene.glyphs.len() == 3)
    });
    let scene = surface.last_scene().unwrap();
    assert_eq!(session.mode(), Mode::Streaming);
    assert_eq!(scene.glyphs[0].dy(), 50);
    assert!(scene.glyphs[0].x() <= 300);
    assert!(scene.needle.is_some());
    assert!(scene.marker.is_some());

    // Stopped: the whole capture is laid out from x = 0.
    let samples = session.on_recording_stopped();
    assert_eq!(samples.len(), 3);
    assert_eq!(session.mode(), Mode::FullGraph);
    session.wait_for_redraw();

    let scene = surface.last_scene().unwrap();
    let xs: Vec<i32> = scene.glyphs.iter().map(|glyph| glyph.x()).collect();
    assert_eq!(xs, vec![0, 8, 16]);
    assert!(scene.needle.is_none());
    assert_eq!(scene.labels[0].text, "00:00");

    // Content fits, so pan stays at zero.
    session.pan(-500);
    assert_eq!(session.pan_offset(), 0);

    // A new capture starts from an empty buffer.
    session.on_recording_started();
    assert_eq!(session.sample_count(), 0);
    assert_eq!(session.mode(), Mode::Streaming);
}

#[test]
fn test_saved_capture_views_the_same() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("take.toml");

    let samples: Vec<_> = (0..120u64)
        .map(|i| wavegraph::graph::Sample::new(i * 150, (i as u32 * 311) % 30_000))
        .collect();
    let frozen = FrozenSamples::from(samples);
    Capture::from(&frozen).save(&path).unwrap();

    let render = |samples: FrozenSamples| {
        let mut session = GraphSession::new(GraphSettings::new(WaveLength::new(6)));
        let surface = MemorySurface::new(Viewport::new(300, 80));
        session.attach_to_surface(Box::new(surface.clone()));
        session.show_full_graph(samples);
        session.pan(-200);
        session.wait_for_redraw();
        surface.last_scene().unwrap()
    };

    let original = render(frozen);
    let reloaded = render(FrozenSamples::from(Capture::load(&path).unwrap()));

    assert_eq!(original, reloaded);
    // 120 * 6 + 50 = 770 wide, so -200 is within bounds.
    assert_eq!(original.glyphs[0].x(), 33 * 6 - 200);
    assert!(original.labels.iter().all(|label| label.text.ends_with(":00")
        || label.text.ends_with(":05")
        || label.text.ends_with(":10")
        || label.text.ends_with(":15")));
}

#[test]
fn test_surface_swap_mid_stream() {
    let mut session = GraphSession::default();
    let first = MemorySurface::new(Viewport::new(120, 60));
    let second = MemorySurface::new(Viewport::new(240, 60));

    session.attach_to_surface(Box::new(first.clone()));
    session.on_recording_started();
    session.on_sample(0, 20_000);
    wait_until(|| first.frame_count() > 0);

    let detached = session.detach_surface();
    assert!(detached.is_some());
    let frames = first.frame_count();

    session.attach_to_surface(Box::new(second.clone()));
    wait_until(|| second.frame_count() > 0);

    assert_eq!(first.frame_count(), frames);
    assert_eq!(session.viewport(), Viewport::new(240, 60));
    assert_eq!(second.last_scene().unwrap().viewport.width, 240);
}
