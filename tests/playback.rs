use approx::assert_relative_eq;
use bytesynth::{
    Command, ErrorPolicy, LoopPlayer, MusicLibrary, NodeKind, Opcode, ParamOpcode, Recorder,
    Synth, Waveform, CENTER, REST_CODE, TRACK_END,
};

fn starts(graph: &Recorder) -> Vec<f64> {
    graph
        .commands()
        .iter()
        .filter_map(|c| match *c {
            Command::Start { time, .. } => Some(time),
            _ => None,
        })
        .collect()
}

#[test]
fn minimal_library_plays_nothing() {
    let data = [
        1, 1, // 1 instrument, 1 song
        0, // empty program
        1, 50, 0, 4, // 1 track
        0, 0, CENTER, 0, //
        TRACK_END,
    ];
    let library = MusicLibrary::from_slice(&data).unwrap();
    let song = &library.songs[0];
    assert_eq!(song.tracks.len(), 1);
    assert!(song.tracks[0].voices.iter().all(Vec::is_empty));

    let mut synth = Synth::new(&library, (1, 2));
    let mut graph = Recorder::new();
    let out = graph.destination();
    let timing = synth.play_song(&mut graph, song, out, 4.0).unwrap();

    assert_eq!(timing.end_time, 4.0);
    assert!(starts(&graph).is_empty());
}

fn lead() -> Vec<u8> {
    let square = u8::from(Opcode::Node(NodeKind::Oscillator(Waveform::Square)));
    let saw = u8::from(Opcode::Node(NodeKind::Oscillator(Waveform::Saw)));
    vec![
        Opcode::Node(NodeKind::Gain).into(),
        ParamOpcode::GainEnvelope.into(),
        80,
        40,
        20,
        30,
        Opcode::Repeat.into(),
        1,
        Opcode::Node(NodeKind::StereoPanner).into(),
        ParamOpcode::RandomBipolar.into(),
        100,
        saw,
        ParamOpcode::Note.into(),
        CENTER,
        ParamOpcode::RandomBipolar.into(),
        60,
        Opcode::EndRepeat.into(),
        square,
        ParamOpcode::Note.into(),
        CENTER - 12,
        ParamOpcode::Default.into(),
    ]
}

fn song_data() -> Vec<u8> {
    let lead = lead();
    let mut data = vec![2, 1, lead.len() as u8];
    data.extend_from_slice(&lead);
    // Broken instrument: unknown parameter opcode
    data.extend_from_slice(&[2, 3, 42]);
    // 0.1 s ticks, 8 ticks per loop, 2 tracks
    data.extend_from_slice(&[2, 50, 0, 8]);
    data.extend_from_slice(&[0, 5, CENTER + 20, 0]);
    data.extend_from_slice(&[1, 0, CENTER, 2]);
    // Two voices, then a rest
    data.extend_from_slice(&[REST_CODE + 2, 0, 4, 3, 3, REST_CODE, TRACK_END]);
    data.extend_from_slice(&[10, TRACK_END]);
    // Durations
    data.extend_from_slice(&[2, 2, 4]);
    data.extend_from_slice(&[8]);

    data
}

#[test]
fn decodes_and_plays_a_song() {
    let library = MusicLibrary::from_slice(&song_data()).unwrap();
    let song = &library.songs[0];
    let lead = &song.tracks[0];
    assert_eq!(lead.voices.len(), 2);
    assert_eq!(lead.voices[0], [Some(60), Some(63), None]);
    assert_eq!(lead.voices[1], [Some(64), Some(67), None]);
    assert!(lead.pan.is_some());
    for track in &song.tracks {
        for voice in &track.voices {
            assert_eq!(voice.len(), track.durations.len());
        }
    }

    let mut synth = Synth::new(&library, (3, 4));
    let mut graph = Recorder::new();
    let out = graph.destination();
    let timing = synth.play_song(&mut graph, song, out, 1.0).unwrap();

    // Each lead note: 2 saws from the repeat, 1 square
    assert_eq!(graph.count(NodeKind::Oscillator(Waveform::Saw)), 8);
    assert_eq!(graph.count(NodeKind::Oscillator(Waveform::Square)), 4);
    // Panner for the lead track, plus 2 per note
    assert_eq!(graph.count(NodeKind::StereoPanner), 9);

    let mut times = starts(&graph);
    times.dedup();
    assert_eq!(times.len(), 4);
    assert_relative_eq!(times[0], 1.0);
    assert_relative_eq!(times[1], 1.2, max_relative = 1e-12);

    assert_relative_eq!(timing.loop_time, 0.8, max_relative = 1e-12);
    // The release tail runs past the loop point
    assert!(timing.end_time > 1.0 + timing.loop_time);
}

#[test]
fn broken_track_policy() {
    let library = MusicLibrary::from_slice(&song_data()).unwrap();
    let song = &library.songs[0];

    let mut synth = Synth::new(&library, (3, 4)).with_error_policy(ErrorPolicy::Abort);
    let mut graph = Recorder::new();
    let out = graph.destination();
    let error = synth.play_song(&mut graph, song, out, 0.0).unwrap_err();
    assert_eq!(
        error.to_string(),
        "Instrument failed on track 1, voice 0, event 0"
    );

    let mut synth = Synth::new(&library, (3, 4));
    let mut graph = Recorder::new();
    assert!(synth.play_song(&mut graph, song, out, 0.0).is_ok());
}

#[test]
fn loops_overlap_release_tails() {
    let library = MusicLibrary::from_slice(&song_data()).unwrap();
    let mut synth = Synth::new(&library, (5, 6));
    let mut graph = Recorder::new();
    let out = graph.destination();
    let mut player = LoopPlayer::new(0, 0.5, 0.1);

    for frame in 0..50 {
        graph.set_now(f64::from(frame) * 0.05);
        player.update(&mut synth, &mut graph, out).unwrap();
    }

    // Passes start at 0.5, 1.3 and 2.1, each scheduled 0.1 s ahead
    assert_eq!(player.passes(), 3);
    assert_relative_eq!(player.next_start(), 2.9, max_relative = 1e-12);
    assert!(player.end_time() > 2.1 + 0.8);
}
