//! Story listing and playback.

use anyhow::{bail, Context as _, Result};
use dialoguer::Select;
use serde_json::json;
use shelf_stories::{split_paragraphs, to_html_paragraphs, Library, Player};

use super::{StoriesArgs, StoriesCommand};
use crate::context::Context;

const RESTART: &str = "شروع دوباره";
const BACK: &str = "بازگشت به فهرست";

/// Run the stories command.
pub async fn run(args: StoriesArgs, ctx: &Context) -> Result<()> {
    let path = ctx.stories_path();
    let library = Library::load(&path)
        .with_context(|| format!("Failed to load stories from {}", path.display()))?;

    match args.command {
        StoriesCommand::List => list(&library, ctx),
        StoriesCommand::Play { id } => play(&library, id, ctx),
        StoriesCommand::Show { id, node } => show(&library, &id, &node, ctx),
    }
}

fn list(library: &Library, ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        let rows: Vec<_> = library
            .stories()
            .iter()
            .map(|s| {
                json!({
                    "id": s.id,
                    "title": s.title,
                    "tagline": s.tagline(),
                    "image": s.image,
                    "nodes": s.nodes.len(),
                    "endings": s.endings(),
                })
            })
            .collect();
        ctx.output.json(&rows);
        return Ok(());
    }

    ctx.output.header(&format!("Stories ({})", library.len()));
    for story in library.stories() {
        ctx.output
            .table_row(&[story.id.as_str(), story.title.as_str(), story.tagline()], &[12, 24, 0]);
    }
    Ok(())
}

fn pick_story(library: &Library) -> Result<String> {
    let titles: Vec<&str> = library.stories().iter().map(|s| s.title.as_str()).collect();
    let index = Select::new()
        .with_prompt("Choose a story")
        .items(&titles)
        .default(0)
        .interact()?;
    Ok(library.stories()[index].id.clone())
}

fn play(library: &Library, id: Option<String>, ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        bail!("Interactive play is not available with --json");
    }
    if library.is_empty() {
        bail!("The story library is empty");
    }

    let mut player = Player::new(library);
    let id = match id {
        Some(id) => id,
        None => pick_story(library)?,
    };
    let mut scene = player.open(&id)?;
    ctx.output.header(&scene.story.title);

    loop {
        println!();
        for paragraph in split_paragraphs(&scene.node.text) {
            println!("{}\n", paragraph);
        }

        if scene.is_ending() {
            let index = Select::new()
                .with_prompt("The end")
                .items(&[RESTART, BACK])
                .default(0)
                .interact()?;
            if index == 0 {
                scene = player.restart()?;
                continue;
            }
            if let Some(last) = player.close() {
                ctx.output.debug(&format!("closed {}", last));
            }
            return Ok(());
        }

        let choices: Vec<&str> = scene.node.choices.iter().map(|c| c.text.as_str()).collect();
        let index = Select::new().items(&choices).default(0).interact()?;
        scene = player.choose(index)?;
    }
}

fn show(library: &Library, id: &str, node: &str, ctx: &Context) -> Result<()> {
    let story = library
        .get(id)
        .with_context(|| format!("Unknown story: {}", id))?;
    let Some(passage) = story.node(node) else {
        bail!("Story '{}' has no node '{}'", id, node);
    };

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "story": story.id,
            "node": node,
            "html": to_html_paragraphs(&passage.text),
            "choices": passage.choices,
            "ending": passage.ending,
        }));
        return Ok(());
    }

    println!("{}", to_html_paragraphs(&passage.text));
    for choice in &passage.choices {
        ctx.output
            .list_item(&format!("{} → {}", choice.text, choice.next));
    }
    Ok(())
}
