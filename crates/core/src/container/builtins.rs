use super::{ModusContainer, SYLL_PREFIX};
use crate::fuzzy::find_closest;
use crate::{
    normalize_save_path, read_deck_from_file, write_deck_to_file, CommandError, CommandMap,
    CommandResult, ConfigError, PersistenceError,
};
use std::path::PathBuf;

/// Handler for a `syll.` command.
pub type HostHandler = fn(&mut ModusContainer, &[String]) -> CommandResult;

pub(super) fn host_command_map() -> Result<CommandMap<HostHandler>, ConfigError> {
    let mut map: CommandMap<HostHandler> = CommandMap::new();
    map.put("help", help, "help [command]")?;
    map.put("listModi", list_modi, "listModi")?;
    map.put(
        "selectModus",
        select_modus,
        "selectModus <name>[, new|keep|save]",
    )?;
    map.put("describeModus", describe_modus, "describeModus")?;
    map.put("resetModus", reset_modus, "resetModus")?;
    map.put("saveDeckToFile", save_deck_to_file, "saveDeckToFile [path]")?;
    map.put("loadDeckFromFile", load_deck_from_file, "loadDeckFromFile [path]")?;
    map.put("deleteDeck", delete_deck, "deleteDeck")?;
    map.put("deleteSaveFile", delete_save_file, "deleteSaveFile [path]")?;
    map.put("showLooseItems", show_loose_items, "showLooseItems")?;
    Ok(map)
}

fn expect_args(args: &[String], allowed: std::ops::RangeInclusive<usize>) -> CommandResult {
    if allowed.contains(&args.len()) {
        Ok(())
    } else {
        Err(CommandError::arg_count(args.len()))
    }
}

fn save_path(container: &ModusContainer, args: &[String]) -> PathBuf {
    match args.first().map(|arg| arg.trim()) {
        Some(path) if !path.is_empty() => normalize_save_path(path),
        _ => container.save_file.clone(),
    }
}

fn help(container: &mut ModusContainer, args: &[String]) -> CommandResult {
    expect_args(args, 0..=1)?;
    if let Some(command) = args.first() {
        let Some((_, entry)) = container.host_commands.lookup(command) else {
            return Err(CommandError::runtime(format!(
                "no sylladex command named `{command}`"
            )));
        };
        let line = format!("{SYLL_PREFIX}{}", entry.description);
        container.buffer.writeln(&line);
        return Ok(());
    }
    let lines: Vec<String> = container
        .host_commands
        .iter()
        .map(|(_, entry)| format!("  {SYLL_PREFIX}{}", entry.description))
        .collect();
    container.buffer.writeln("Sylladex commands:");
    for line in &lines {
        container.buffer.writeln(line);
    }
    let modus_commands = container.active_commands();
    if !modus_commands.is_empty() {
        container
            .buffer
            .writeln(&format!("Modus commands: {}", modus_commands.join(", ")));
    }
    Ok(())
}

fn list_modi(container: &mut ModusContainer, args: &[String]) -> CommandResult {
    expect_args(args, 0..=0)?;
    let active = container.active_name().map(str::to_string);
    container.buffer.writeln("Available modi:");
    for id in container.candidate_ids() {
        let marker = if active.as_deref() == Some(id) { "*" } else { " " };
        container.buffer.writeln(&format!(" {marker} {id}"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeckDecision {
    New,
    Keep,
    Save,
}

fn select_modus(container: &mut ModusContainer, args: &[String]) -> CommandResult {
    expect_args(args, 1..=2)?;
    let ids = container.candidate_ids();
    let Some(hit) = find_closest(&ids, &args[0]) else {
        return Err(CommandError::runtime(format!(
            "no modus named `{}`",
            args[0]
        )));
    };
    let had_active = container.active.is_some();
    let decision = match args.get(1).map(|arg| arg.to_lowercase()).as_deref() {
        None if had_active => DeckDecision::New,
        None => DeckDecision::Keep,
        Some("new") => DeckDecision::New,
        Some("keep") => DeckDecision::Keep,
        Some("save") => DeckDecision::Save,
        Some(other) => {
            return Err(CommandError::IllegalSyntax(format!(
                "`{other}` is not one of new, keep or save"
            )))
        }
    };
    if had_active && decision == DeckDecision::Save {
        container.request_save()?;
        let path = container.save_file.clone();
        write_deck_to_file(container.buffer.deck(), &path)
            .map_err(|err| CommandError::runtime(format!("could not save deck: {err}")))?;
        container
            .buffer
            .writeln(&format!("Deck saved to {}.", path.display()));
    }
    container
        .select_modus(&hit.name)
        .map_err(|err| CommandError::runtime(err.to_string()))?;
    if decision != DeckDecision::Keep {
        container.buffer.deck().clear();
    }
    container
        .buffer
        .writeln(&format!("Modus selected: {}", hit.name));
    if decision == DeckDecision::Keep && !container.buffer.deck().is_empty() {
        container
            .buffer
            .writeln("The deck was kept. Use the modus' load command to fill it.");
    }
    let commands = container.active_commands();
    container
        .buffer
        .writeln(&format!("Commands: {}", commands.join(", ")));
    let description = container.request_description()?;
    container.buffer.writeln(&description);
    container.request_draw()?;
    Ok(())
}

fn describe_modus(container: &mut ModusContainer, args: &[String]) -> CommandResult {
    expect_args(args, 0..=0)?;
    let description = container.request_description()?;
    container.buffer.writeln(&description);
    Ok(())
}

fn reset_modus(container: &mut ModusContainer, args: &[String]) -> CommandResult {
    expect_args(args, 0..=0)?;
    if container.active.is_none() {
        return Err(crate::RequestError::NoModusSelected.into());
    }
    container.buffer.write("Refreshing the modus...");
    container
        .reset_modus()
        .map_err(|err| CommandError::fatal(format!("modus reset failed: {err}")))?;
    container.request_draw()?;
    container
        .buffer
        .writeln("success. Consider using the modus' load command before continuing.");
    Ok(())
}

fn save_deck_to_file(container: &mut ModusContainer, args: &[String]) -> CommandResult {
    expect_args(args, 0..=1)?;
    let path = save_path(container, args);
    container.buffer.write("Saving deck to file... ");
    if container.active.is_some() {
        container.request_save()?;
    }
    match write_deck_to_file(container.buffer.deck(), &path) {
        Ok(_) => {
            container.buffer.writeln("Save successful.");
            Ok(())
        }
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "deck save failed");
            container.buffer.writeln("save failed.");
            Err(CommandError::runtime(
                "saving file - could not save. Please try again in a bit",
            ))
        }
    }
}

fn load_deck_from_file(container: &mut ModusContainer, args: &[String]) -> CommandResult {
    expect_args(args, 0..=1)?;
    let path = save_path(container, args);
    container.buffer.write("Loading deck from file... ");
    let cards = match read_deck_from_file(&path) {
        Ok(cards) => cards,
        Err(PersistenceError::Corrupt(reason)) => {
            tracing::error!(path = %path.display(), %reason, "corrupt deck file");
            container.buffer.writeln("load failed.");
            return Err(CommandError::runtime(
                "found file is corrupted or invalid. load failed",
            ));
        }
        Err(PersistenceError::Io(err)) => {
            tracing::error!(path = %path.display(), error = %err, "deck load failed");
            container.buffer.writeln("load failed.");
            return Err(CommandError::runtime(format!(
                "loading file {} - {err}",
                path.display()
            )));
        }
    };
    container.buffer.deck().replace(cards);
    container.buffer.writeln("load successful.");
    let Some(modus) = container.active.as_mut() else {
        return Ok(());
    };
    container.buffer.take_modus_input();
    modus.load(&mut container.buffer)?;
    container.sync();
    Ok(())
}

fn delete_deck(container: &mut ModusContainer, args: &[String]) -> CommandResult {
    expect_args(args, 0..=0)?;
    container.buffer.write("Deleting deck...");
    container.buffer.deck().clear();
    container.buffer.writeln("deletion successful.");
    Ok(())
}

fn delete_save_file(container: &mut ModusContainer, args: &[String]) -> CommandResult {
    expect_args(args, 0..=1)?;
    let path = save_path(container, args);
    container.buffer.write("Deleting save file...");
    match std::fs::remove_file(&path) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            container.buffer.writeln("deletion failed.");
            return Err(CommandError::runtime(format!(
                "could not delete {}: {err}",
                path.display()
            )));
        }
    }
    container.buffer.writeln("deletion successful.");
    Ok(())
}

fn show_loose_items(container: &mut ModusContainer, args: &[String]) -> CommandResult {
    expect_args(args, 0..=0)?;
    let items = container.buffer.open_hand().snapshot();
    if items.is_empty() {
        container.buffer.writeln("The hand is empty.");
    } else {
        container
            .buffer
            .writeln(&format!("Items in the hand are currently: {}.", items.join(", ")));
    }
    Ok(())
}
