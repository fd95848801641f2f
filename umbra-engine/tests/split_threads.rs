//! Control and render halves driven from two threads, the way a game hosts
//! the drone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use umbra_engine::{dissonance_gain, AudioGenerator, EnvelopeState, Synthesizer};

#[test]
fn render_thread_sees_control_changes() {
    let synth = Synthesizer::with_seed(44_100, 2, 5);
    let (mut control, mut voice) = synth.split();

    let done = Arc::new(AtomicBool::new(false));
    let heard = Arc::new(AtomicBool::new(false));
    let (done_render, heard_render) = (done.clone(), heard.clone());

    let render = thread::spawn(move || {
        let mut buf = vec![0.0_f32; 2 * 256];
        while !done_render.load(Ordering::Acquire) {
            voice.generate(&mut buf, 256);
            for &s in &buf {
                assert!((-1.0..=1.0).contains(&s));
                if s != 0.0 {
                    heard_render.store(true, Ordering::Release);
                }
            }
            thread::yield_now();
        }
        // one more block after the game loop is finished
        voice.generate(&mut buf, 256);
        (buf, voice.phases())
    });

    control.set_intensity(1.0);
    control.set_tension(0.9);
    control.start();
    for _ in 0..8 {
        control.update(0.25);
        thread::sleep(Duration::from_millis(2));
    }
    assert_eq!(control.state(), EnvelopeState::Steady);

    let deadline = Instant::now() + Duration::from_secs(5);
    while !heard.load(Ordering::Acquire) && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    assert!(heard.load(Ordering::Acquire), "render thread never heard the drone");

    control.stop();
    for _ in 0..8 {
        control.update(0.25);
    }
    assert_eq!(control.state(), EnvelopeState::Stopped);

    done.store(true, Ordering::Release);
    let (last, phases) = render.join().unwrap();

    assert!(last.iter().all(|&s| s == 0.0), "stopped drone kept sounding");
    for p in phases.as_array() {
        assert!((0.0..1.0).contains(&p));
    }
}

#[test]
fn tritone_only_sounds_above_half_tension() {
    assert_eq!(dissonance_gain(0.5), 0.0);
    assert_eq!(dissonance_gain(1.0), 0.1);

    let mut at_threshold = Synthesizer::with_seed(44_100, 1, 8);
    let mut full = Synthesizer::with_seed(44_100, 1, 8);
    for (s, tension) in [(&mut at_threshold, 0.5), (&mut full, 1.0)] {
        s.set_tension(tension);
        s.start();
        s.update(2.0);
    }

    let mut buf = vec![0.0_f32; 4096];
    at_threshold.generate(&mut buf, 4096);
    full.generate(&mut buf, 4096);

    assert_eq!(at_threshold.phases().dissonance, 0.0);
    assert!(full.phases().dissonance > 0.0);
}
