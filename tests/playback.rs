use stage_director::error::PlaybackError;
use stage_director::format::*;
use stage_director::runtime::*;

/// One scene: D0 offers two choices, D1 closes the story.
fn scenario_a() -> Story {
    Story::new(vec![Scene::new("s0", "Crossing")
        .with_dialogue(
            Dialogue::new("d0", "alice", "The lift is broken. What do you do?")
                .with_choice(
                    DialogueChoice::new("help", "Offer to help")
                        .with_effect(Effect::add(EMPATHY, 1.0))
                        .to_dialogue("d1"),
                )
                .with_choice(
                    DialogueChoice::new("leave", "Walk away")
                        .with_effect(Effect::add(EMPATHY, -5.0))
                        .to_dialogue("d1"),
                ),
        )
        .with_dialogue(Dialogue::new("d1", "narrator", "The day goes on."))])
}

/// Branching story with responses converging on a shared dialogue, a scene
/// jump and a gated ending.
fn branching_story() -> Story {
    Story::new(vec![
        Scene::new("station", "Station")
            .with_dialogue(
                Dialogue::new("ask", "bob", "Can you read me the timetable?")
                    .with_choice(
                        DialogueChoice::new("read", "Read it aloud")
                            .with_effect(Effect::add(EMPATHY, 10.0))
                            .with_effect(Effect::add(CONFIDENCE, 5.0))
                            .to_dialogue("thanks"),
                    )
                    .with_choice(
                        DialogueChoice::new("point", "Point at the screen")
                            .with_effect(Effect::add(EMPATHY, -10.0))
                            .to_dialogue("sigh"),
                    ),
            )
            .with_dialogue(
                Dialogue::new("thanks", "bob", "Thank you!")
                    .as_response()
                    .converging_to("train"),
            )
            .with_dialogue(
                Dialogue::new("sigh", "bob", "I can't see it.")
                    .as_response()
                    .converging_to("train"),
            )
            .with_dialogue(
                Dialogue::new("train", "narrator", "The train arrives.").with_choice(
                    DialogueChoice::new("board", "Board")
                        .with_effect(Effect::add(AUTONOMY, 3.0))
                        .to_scene("city"),
                ),
            ),
        Scene::new("city", "City")
            .with_dialogue(Dialogue::new("arrive", "narrator", "You reach the city."))
            .with_dialogue(
                Dialogue::new("friend", "bob", "Let's meet again!").with_condition(
                    Condition::new(EMPATHY, ConditionOperator::GreaterOrEqual, 55.0),
                ),
            )
            .with_dialogue(Dialogue::new("end", "narrator", "The end.")),
    ])
}

fn play(story: Story, choices: &[&str]) -> (GameState, Option<String>, bool) {
    let mut director = StageDirector::new(story, 0);
    for choice in choices {
        if director.available_choices().is_empty() {
            director.advance().unwrap();
        }
        director.choose(choice).unwrap();
    }
    while !director.is_game_over() {
        director.advance().unwrap();
    }
    (
        director.snapshot(),
        director.current_dialogue().map(|d| d.id.clone()),
        director.is_game_over(),
    )
}

#[test]
fn jump_to_terminal_dialogue_ends_game() {
    let story = scenario_a();
    let mut director = StageDirector::new(story.clone(), 0);
    let initial = director.game_state().get(EMPATHY);

    let choice = story.scenes[0].dialogues[0].choices[0].clone();
    let transition = director.make_choice(&choice).unwrap();

    assert_eq!(director.game_state().get(EMPATHY), initial + 1.0);
    assert_eq!(director.current_dialogue().unwrap().id, "d1");
    assert!(director.is_game_over());
    assert!(transition.game_over);
    assert_eq!(transition.changes.len(), 1);
    assert_eq!(transition.changes[0].delta(), 1.0);
}

#[test]
fn scene_jump_resets_dialogue_index() {
    let story = Story::new(vec![
        Scene::new("s0", "First").with_dialogue(
            Dialogue::new("d0", "narrator", "Leave?")
                .with_choice(DialogueChoice::new("go", "Go").to_scene("s1")),
        ),
        Scene::new("s1", "Second")
            .with_dialogue(Dialogue::new("d1", "narrator", "Arrived."))
            .with_dialogue(Dialogue::new("d2", "narrator", "Settled.")),
    ]);
    let mut director = StageDirector::new(story, 0);

    director.choose("go").unwrap();
    assert_eq!(director.current_scene().unwrap().id, "s1");
    assert_eq!(director.position(), Position::new(1, 0));
    assert!(!director.is_game_over());
}

#[test]
fn dangling_dialogue_target_fails_loud() {
    let story = Story::new(vec![Scene::new("s0", "Broken")
        .with_dialogue(
            Dialogue::new("d0", "narrator", "Pick").with_choice(
                DialogueChoice::new("bad", "Nowhere")
                    .with_effect(Effect::add(EMPATHY, 20.0))
                    .to_dialogue("ghost"),
            ),
        )
        .with_dialogue(Dialogue::new("d1", "narrator", "Unreached"))]);
    let mut director = StageDirector::new(story, 0);

    let result = director.choose("bad");
    assert!(matches!(result, Err(PlaybackError::DialogueNotFound(ref id)) if id == "ghost"));

    // the failed choice left nothing behind
    assert_eq!(director.game_state().get(EMPATHY), 50.0);
    assert_eq!(director.current_dialogue().unwrap().id, "d0");
    assert!(!director.is_game_over());
}

#[test]
fn dangling_convergence_target_fails_loud() {
    let story = Story::new(vec![Scene::new("s0", "Broken")
        .with_dialogue(Dialogue::new("d0", "narrator", "Lost").converging_to("ghost"))
        .with_dialogue(Dialogue::new("d1", "narrator", "Unreached"))]);
    let mut director = StageDirector::new(story, 0);

    assert!(matches!(
        director.advance(),
        Err(PlaybackError::DialogueNotFound(ref id)) if id == "ghost"
    ));
    assert_eq!(director.position(), Position::new(0, 0));
    assert_eq!(director.current_dialogue().unwrap().id, "d0");
    assert!(!director.is_game_over());
}

#[test]
fn dangling_scene_target_fails_loud() {
    let story = Story::new(vec![Scene::new("s0", "Broken").with_dialogue(
        Dialogue::new("d0", "narrator", "Pick")
            .with_choice(DialogueChoice::new("bad", "Nowhere").to_scene("ghost")),
    )]);
    let mut director = StageDirector::new(story, 0);

    assert!(matches!(
        director.choose("bad"),
        Err(PlaybackError::SceneNotFound(ref id)) if id == "ghost"
    ));
}

#[test]
fn empty_story_has_no_content() {
    for _ in 0..3 {
        let director = StageDirector::new(Story::default(), 0);
        assert!(director.current_scene().is_none());
        assert!(director.current_dialogue().is_none());
        assert!(director.is_game_over());
        assert!(director.available_choices().is_empty());
    }
}

#[test]
fn empty_scene_has_no_content() {
    let story = Story::new(vec![
        Scene::new("s0", "Empty"),
        Scene::new("s1", "Full").with_dialogue(Dialogue::new("d0", "narrator", "Hi")),
    ]);
    let mut director = StageDirector::new(story, 0);

    assert_eq!(director.current_scene().unwrap().id, "s0");
    assert!(director.current_dialogue().is_none());
    assert!(director.is_game_over());
    assert!(matches!(director.advance(), Err(PlaybackError::GameOver)));
}

#[test]
fn replay_is_deterministic() {
    let first = play(branching_story(), &["read", "board"]);
    for _ in 0..5 {
        assert_eq!(play(branching_story(), &["read", "board"]), first);
    }

    let other = play(branching_story(), &["point", "board"]);
    assert_ne!(first.0, other.0);
}

#[test]
fn responses_converge_and_gate_later_dialogue() {
    let mut director = StageDirector::new(branching_story(), 0);

    director.choose("read").unwrap();
    assert_eq!(director.current_dialogue().unwrap().id, "thanks");

    // response follows its convergence target
    director.advance().unwrap();
    assert_eq!(director.current_dialogue().unwrap().id, "train");

    director.choose("board").unwrap();
    assert_eq!(director.current_dialogue().unwrap().id, "arrive");

    // empathy is 60, so the friendly line plays
    director.advance().unwrap();
    assert_eq!(director.current_dialogue().unwrap().id, "friend");
    director.advance().unwrap();
    assert_eq!(director.current_dialogue().unwrap().id, "end");
    assert!(director.is_game_over());

    let state = director.game_state();
    assert_eq!(state.get(EMPATHY), 60.0);
    assert_eq!(state.get(CONFIDENCE), 55.0);
    assert_eq!(state.get(AUTONOMY), 53.0);
}

#[test]
fn failed_condition_skips_dialogue() {
    let mut director = StageDirector::new(branching_story(), 0);
    director.choose("point").unwrap();
    assert_eq!(director.current_dialogue().unwrap().id, "sigh");
    director.advance().unwrap();
    director.choose("board").unwrap();

    // empathy is 40, "friend" is skipped
    director.advance().unwrap();
    assert_eq!(director.current_dialogue().unwrap().id, "end");
    assert!(director.is_game_over());
}

#[test]
fn linear_advance_moves_to_next_index() {
    let story = Story::new(vec![Scene::new("s0", "Walk")
        .with_dialogue(Dialogue::new("d0", "narrator", "One"))
        .with_dialogue(Dialogue::new("d1", "narrator", "Two"))
        .with_dialogue(Dialogue::new("d2", "narrator", "Three"))]);
    let mut director = StageDirector::new(story, 0);

    let transition = director.advance().unwrap();
    assert_eq!(transition.position, Position::new(0, 1));
    assert!(transition.changes.is_empty());
    assert!(!director.is_game_over());
}

#[test]
fn responses_skipped_in_sequence_by_default() {
    let story = Story::new(vec![Scene::new("s0", "Talk")
        .with_dialogue(
            Dialogue::new("q", "bob", "Coffee?")
                .with_choice(DialogueChoice::new("yes", "Yes").to_dialogue("r_yes"))
                .with_choice(DialogueChoice::new("later", "Later")),
        )
        .with_dialogue(Dialogue::new("r_yes", "bob", "Great!").as_response())
        .with_dialogue(Dialogue::new("next", "narrator", "Time passes."))
        .with_dialogue(Dialogue::new("end", "narrator", "Fin."))]);

    let mut director = StageDirector::new(story.clone(), 0);
    director.choose("later").unwrap();
    assert_eq!(director.current_dialogue().unwrap().id, "next");

    let config = DirectorConfig::new().with_response_policy(ResponsePolicy::Sequential);
    let mut director = StageDirector::with_config(story, 0, config);
    director.choose("later").unwrap();
    assert_eq!(director.current_dialogue().unwrap().id, "r_yes");
}

#[test]
fn game_over_is_permanent() {
    let story = scenario_a();
    let mut director = StageDirector::new(story.clone(), 0);
    director.choose("help").unwrap();
    assert!(director.is_game_over());

    let state = director.snapshot();
    let other = story.scenes[0].dialogues[0].choices[1].clone();
    assert!(matches!(
        director.make_choice(&other),
        Err(PlaybackError::GameOver)
    ));
    assert!(matches!(director.advance(), Err(PlaybackError::GameOver)));

    assert_eq!(director.game_state(), &state);
    assert_eq!(director.current_dialogue().unwrap().id, "d1");
    assert!(director.is_game_over());
}

#[test]
fn foreign_choice_is_rejected() {
    let mut director = StageDirector::new(branching_story(), 0);
    let foreign = DialogueChoice::new("board", "Board").to_scene("city");

    assert!(matches!(
        director.make_choice(&foreign),
        Err(PlaybackError::ChoiceNotInDialogue(ref id)) if id == "board"
    ));
    assert_eq!(director.position(), Position::new(0, 0));
}

#[test]
fn gated_choice_is_unavailable() {
    let story = Story::new(vec![Scene::new("s0", "Door")
        .with_dialogue(
            Dialogue::new("d0", "narrator", "A locked door.")
                .with_choice(
                    DialogueChoice::new("force", "Force it").with_condition(Condition::new(
                        CONFIDENCE,
                        ConditionOperator::Greater,
                        80.0,
                    )),
                )
                .with_choice(DialogueChoice::new("knock", "Knock")),
        )
        .with_dialogue(Dialogue::new("d1", "narrator", "Someone opens."))]);
    let mut director = StageDirector::new(story, 0);

    let available: Vec<_> = director
        .available_choices()
        .iter()
        .map(|c| c.id.clone())
        .collect();
    assert_eq!(available, vec!["knock".to_string()]);
    assert!(matches!(
        director.choose("force"),
        Err(PlaybackError::ChoiceUnavailable(_))
    ));
    director.choose("knock").unwrap();
    assert!(director.is_game_over());
}

#[test]
fn effects_accumulate_per_stat() {
    let deltas = [4.0, -2.5, 7.0, -1.5, 3.0];
    let mut scene = Scene::new("s0", "Loop");
    for (i, delta) in deltas.iter().enumerate() {
        scene = scene.with_dialogue(
            Dialogue::new(format!("d{}", i), "narrator", "step").with_choice(
                DialogueChoice::new(format!("c{}", i), "ok")
                    .with_effect(Effect::add("courage", *delta)),
            ),
        );
    }
    scene = scene.with_dialogue(Dialogue::new("end", "narrator", "done"));

    let mut director = StageDirector::new(Story::new(vec![scene]), 0);
    for i in 0..deltas.len() {
        director.choose(&format!("c{}", i)).unwrap();
    }

    assert!(director.is_game_over());
    assert_eq!(
        director.game_state().get("courage"),
        deltas.iter().sum::<f64>()
    );
}

#[test]
fn bounds_clamp_stats() {
    let story = Story::new(vec![Scene::new("s0", "Big")
        .with_dialogue(
            Dialogue::new("d0", "narrator", "All in").with_choice(
                DialogueChoice::new("c0", "Go").with_effect(Effect::add(EMPATHY, 500.0)),
            ),
        )
        .with_dialogue(Dialogue::new("d1", "narrator", "Done"))]);
    let config = DirectorConfig::new().with_bounds(StatBounds::percent());
    let mut director = StageDirector::with_config(story, 0, config);

    director.choose("c0").unwrap();
    assert_eq!(director.game_state().get(EMPATHY), 100.0);
}

#[test]
fn explicit_ending_stops_mid_scene() {
    let story = Story::new(vec![Scene::new("s0", "Cliff")
        .with_dialogue(
            Dialogue::new("d0", "narrator", "Jump?")
                .with_choice(DialogueChoice::new("jump", "Jump").to_dialogue("fall"))
                .with_choice(DialogueChoice::new("stay", "Stay")),
        )
        .with_dialogue(Dialogue::new("fall", "narrator", "You fall.").as_ending())
        .with_dialogue(Dialogue::new("safe", "narrator", "You are safe."))]);

    let mut director = StageDirector::new(story, 0);
    director.choose("jump").unwrap();
    assert!(director.is_game_over());
    assert_eq!(director.current_dialogue().unwrap().id, "fall");
}

#[test]
fn dialogue_jump_crosses_scenes() {
    let story = Story::new(vec![
        Scene::new("s0", "Hall").with_dialogue(
            Dialogue::new("d0", "narrator", "Take the stairs?").with_choice(
                DialogueChoice::new("stairs", "Yes")
                    .with_effect(Effect::add(AUTONOMY, 2.0))
                    .to_dialogue("roof_view"),
            ),
        ),
        Scene::new("s1", "Roof")
            .with_dialogue(Dialogue::new("roof_door", "narrator", "A heavy door."))
            .with_dialogue(Dialogue::new("roof_view", "narrator", "The view is wide."))
            .with_dialogue(Dialogue::new("roof_end", "narrator", "Time to go.")),
    ]);
    let mut director = StageDirector::new(story, 0);

    director.choose("stairs").unwrap();
    assert_eq!(director.position(), Position::new(1, 1));
    assert_eq!(director.current_scene().unwrap().id, "s1");
    assert!(!director.is_game_over());
}

#[test]
fn initial_scene_index_is_honoured() {
    let mut director = StageDirector::new(branching_story(), 1);
    assert_eq!(director.current_scene().unwrap().id, "city");
    assert_eq!(director.current_dialogue().unwrap().id, "arrive");

    director.advance().unwrap();
    director.reset();
    assert_eq!(director.position(), Position::new(1, 0));
}

#[test]
fn reset_restores_initial_state() {
    let mut director = StageDirector::new(branching_story(), 0);
    director.choose("read").unwrap();
    director.advance().unwrap();
    director.choose("board").unwrap();

    director.reset();
    assert_eq!(director.position(), Position::new(0, 0));
    assert_eq!(director.game_state(), &DirectorConfig::default().initial_state());
    assert!(!director.is_game_over());
}

#[test]
fn save_and_restore() {
    let mut director = StageDirector::new(branching_story(), 0);
    director.choose("read").unwrap();
    let saved = director.save();

    director.advance().unwrap();
    director.choose("board").unwrap();

    director.restore(saved.clone()).unwrap();
    assert_eq!(director.current_dialogue().unwrap().id, "thanks");
    assert_eq!(director.game_state().get(EMPATHY), 60.0);
    assert_eq!(director.game_state().get(AUTONOMY), 50.0);

    let json = saved.to_json().unwrap();
    assert_eq!(SavedPlayback::from_json(&json).unwrap(), saved);
}

#[test]
fn restore_rejects_other_story() {
    let director = StageDirector::new(branching_story(), 0);
    let saved = director.save();

    let mut other = StageDirector::new(scenario_a(), 0);
    assert!(matches!(
        other.restore(saved),
        Err(PlaybackError::SnapshotMismatch)
    ));

    let mut bad = other.save();
    bad.position = Position::new(0, 9);
    assert!(matches!(
        other.restore(bad),
        Err(PlaybackError::InvalidSnapshot(_))
    ));
}
