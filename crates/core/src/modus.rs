use crate::{
    Card, CommandError, CommandMap, CommandResult, ConfigError, Lookup, ModusBuffer,
};

/// Handler signature for a modus command: the instance, the trimmed
/// arguments and the shared buffer.
pub type ModusHandler<M> = fn(&mut M, &[String], &mut ModusBuffer) -> CommandResult;

/// What a modus reports about itself: its name and its command table.
pub struct ModusDescriptor<M> {
    pub name: String,
    pub commands: CommandMap<ModusHandler<M>>,
}

impl<M> ModusDescriptor<M> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: CommandMap::new(),
        }
    }

    pub fn command(
        mut self,
        name: &str,
        handler: ModusHandler<M>,
        description: &str,
    ) -> Result<Self, ConfigError> {
        self.commands.put(name, handler, description)?;
        Ok(self)
    }

    pub fn fallback(mut self, handler: ModusHandler<M>, description: &str) -> Self {
        self.commands.set_default(handler, description);
        self
    }
}

/// A fetch modus: the policy deciding how cards are stored and retrieved.
pub trait Modus: Send + Sized + 'static {
    /// Only runnable modi may be selected.
    const RUNNABLE: bool;

    fn create() -> Result<Self, ConfigError>;

    fn descriptor(&self) -> Result<ModusDescriptor<Self>, ConfigError>;

    /// Writes the modus' storage back into the shared deck.
    fn save(&mut self, buffer: &mut ModusBuffer) -> Vec<Card> {
        let cards = self.to_deck();
        buffer.deck().replace(cards.clone());
        cards
    }

    /// Rebuilds internal storage from the shared deck. The mode, if any, is
    /// read from the buffer's current input.
    fn load(&mut self, buffer: &mut ModusBuffer) -> CommandResult;

    fn to_deck(&self) -> Vec<Card>;

    fn draw_to_display(&mut self, buffer: &mut ModusBuffer);

    fn description(&self) -> String;

    /// Continues a multi-turn command parked as `Continuation::Step`.
    fn resume(&mut self, step: &str, _data: &[String], _buffer: &mut ModusBuffer) -> CommandResult {
        Err(CommandError::fatal(format!(
            "{} cannot resume step `{}`",
            type_identity::<Self>(),
            step
        )))
    }
}

/// Short type name of `M`, used as its identity.
pub fn type_identity<M>() -> &'static str {
    let full = std::any::type_name::<M>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Object-safe view over a validated modus instance.
pub trait ActiveModus: Send {
    fn name(&self) -> &str;
    fn command_names(&self) -> Vec<String>;
    fn syntax_for(&self, command: &str) -> Option<String>;
    fn execute(&mut self, command: &str, args: &[String], buffer: &mut ModusBuffer)
        -> CommandResult;
    fn save(&mut self, buffer: &mut ModusBuffer) -> Vec<Card>;
    fn load(&mut self, buffer: &mut ModusBuffer) -> CommandResult;
    fn to_deck(&self) -> Vec<Card>;
    fn draw(&mut self, buffer: &mut ModusBuffer);
    fn description(&self) -> String;
    fn resume(&mut self, step: &str, data: &[String], buffer: &mut ModusBuffer) -> CommandResult;
    fn is_valid(&self) -> bool;
}

/// The validated name, instance and command map of one modus.
pub struct Metadata<M: Modus> {
    name: String,
    reference: M,
    command_map: CommandMap<ModusHandler<M>>,
}

impl<M: Modus> Metadata<M> {
    pub(crate) fn new(name: String, reference: M, command_map: CommandMap<ModusHandler<M>>) -> Self {
        Self {
            name,
            reference,
            command_map,
        }
    }

    pub fn reference(&self) -> &M {
        &self.reference
    }

    pub fn command_map(&self) -> &CommandMap<ModusHandler<M>> {
        &self.command_map
    }
}

impl<M: Modus> ActiveModus for Metadata<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn command_names(&self) -> Vec<String> {
        self.command_map.names().map(str::to_string).collect()
    }

    fn syntax_for(&self, command: &str) -> Option<String> {
        self.command_map
            .resolve(command)
            .map(|resolved| resolved.entry.description.clone())
    }

    fn execute(
        &mut self,
        command: &str,
        args: &[String],
        buffer: &mut ModusBuffer,
    ) -> CommandResult {
        let Some(resolved) = self.command_map.resolve(command) else {
            return Err(CommandError::NoSuchCommand(command.to_string()));
        };
        if resolved.lookup == Lookup::Fuzzy {
            if let Some(key) = resolved.key {
                buffer.writeln(&format!("Assuming `{key}`."));
            }
        }
        let handler = resolved.entry.handler;
        tracing::debug!(modus = %self.name, command, args = args.len(), "modus command");
        handler(&mut self.reference, args, buffer)
    }

    fn save(&mut self, buffer: &mut ModusBuffer) -> Vec<Card> {
        self.reference.save(buffer)
    }

    fn load(&mut self, buffer: &mut ModusBuffer) -> CommandResult {
        self.reference.load(buffer)
    }

    fn to_deck(&self) -> Vec<Card> {
        self.reference.to_deck()
    }

    fn draw(&mut self, buffer: &mut ModusBuffer) {
        self.reference.draw_to_display(buffer)
    }

    fn description(&self) -> String {
        self.reference.description()
    }

    fn resume(&mut self, step: &str, data: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        self.reference.resume(step, data, buffer)
    }

    fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
            && self.name == type_identity::<M>()
            && self.command_map.is_valid()
    }
}
