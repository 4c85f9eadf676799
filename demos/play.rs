//! Plays a story exported by the editor, always taking the first available
//! choice, and prints the transcript.
//!
//!     cargo run --example play -- story.json [scene-index]

use anyhow::Context;
use stage_director::format::Story;
use stage_director::outcome::Ending;
use stage_director::runtime::StageDirector;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .context("usage: play <story.json> [scene-index]")?;
    let initial_scene = match args.next() {
        Some(index) => index.parse().context("scene index must be a number")?,
        None => 0,
    };

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path))?;
    let story = Story::from_json(&text)?;
    let mut director = StageDirector::new(story, initial_scene);

    if director.current_dialogue().is_none() {
        println!("Nothing to play.");
        return Ok(());
    }

    loop {
        if let Some(dialogue) = director.current_dialogue() {
            println!("{}: {}", dialogue.speaker, dialogue.text);
        }
        if director.is_game_over() {
            break;
        }

        let first = director.available_choices().first().map(|c| (*c).clone());
        let transition = match first {
            Some(choice) => {
                println!("  > {}", choice.text);
                director.make_choice(&choice)?
            }
            None => director.advance()?,
        };
        for change in &transition.changes {
            println!("  [{} {:+}]", change.stat, change.delta());
        }
    }

    let ending = Ending::for_state(director.game_state());
    println!();
    println!(
        "{} ({}, score {})",
        ending.title,
        ending.grade.label(),
        ending.score
    );
    println!("{}", ending.message);

    for (stat, value) in director.game_state().iter() {
        println!("  {}: {}", stat, value);
    }

    Ok(())
}
