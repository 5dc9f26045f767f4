use sylladex_core::{CommandError, CommandResult, Modus, ModusBuffer};

pub(crate) fn expect_args(args: &[String], count: usize) -> CommandResult {
    if args.len() == count {
        Ok(())
    } else {
        Err(CommandError::arg_count(args.len()))
    }
}

/// `help` shared by the built-in modi: no argument describes `help` itself.
pub(crate) fn describe_command<M: Modus>(
    modus: &M,
    args: &[String],
    buffer: &mut ModusBuffer,
) -> CommandResult {
    let descriptor = modus
        .descriptor()
        .map_err(|err| CommandError::runtime(err.to_string()))?;
    let Some(first) = args.first() else {
        if let Some(desc) = descriptor.commands.describe("help") {
            buffer.writeln(desc);
        }
        return Ok(());
    };
    if args.len() > 1 {
        buffer.writeln("help command invoked. disregarding additional args.");
    }
    match descriptor.commands.lookup(first) {
        Some((name, entry)) => {
            tracing::debug!(command = name, "modus command help");
            buffer.writeln(&entry.description);
            Ok(())
        }
        None => Err(CommandError::runtime(format!(
            "no modus command named `{first}`"
        ))),
    }
}

/// Card items are stored upper-cased; fuzzy lookups compare the same way.
pub(crate) fn item_key(item: &str) -> String {
    item.trim().to_uppercase()
}
