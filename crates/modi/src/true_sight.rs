use crate::common::{describe_command, expect_args, item_key};
use crate::tarot_deck::TarotDeck;
use sylladex_core::fuzzy::find_closest;
use sylladex_core::{
    Card, CommandError, CommandResult, ConfigError, Modus, ModusBuffer, ModusDescriptor,
};

/// A tarot deck whose faces can be read, so cards may be pulled from any
/// depth. Not finished enough to be selected.
#[derive(Debug, Clone)]
pub struct TrueSightDeck {
    deck: TarotDeck,
}

impl TrueSightDeck {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            deck: TarotDeck::with_seed(seed),
        }
    }

    pub fn inner(&self) -> &TarotDeck {
        &self.deck
    }

    /// Depth from the top of the first card holding `item`, nearest name
    /// accepted.
    pub fn find_card_index_by_name(&self, item: &str) -> Option<usize> {
        let wanted = item_key(item);
        let names: Vec<&str> = self.deck.cards().map(Card::item).collect();
        if let Some(depth) = names.iter().position(|name| *name == wanted) {
            return Some(depth);
        }
        find_closest(&names, &wanted).map(|hit| hit.index)
    }

    fn pull(&mut self, depth: usize, buffer: &mut ModusBuffer) -> CommandResult {
        let card = self
            .deck
            .remove_from_top(depth)
            .ok_or_else(|| CommandError::runtime(format!("{} is not a valid index", depth + 1)))?;
        if card.in_use() {
            buffer.open_hand().push(card.item());
        }
        buffer.mark_changed();
        buffer.writeln("success.");
        Ok(())
    }

    fn take_out_card_by_index(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        expect_args(args, 1)?;
        let index = &args[0];
        buffer.write(&format!("Retrieving CARD at index {index}..."));
        let position: usize = index
            .parse()
            .map_err(|_| CommandError::runtime(format!("{index} is not a number")))?;
        let depth = position
            .checked_sub(1)
            .ok_or_else(|| CommandError::runtime(format!("{index} is not a valid index")))?;
        self.pull(depth, buffer)
    }

    fn take_out_card_by_name(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        expect_args(args, 1)?;
        let wanted = item_key(&args[0]);
        buffer.write(&format!("Retrieving {wanted}..."));
        let depth = self
            .find_card_index_by_name(&wanted)
            .ok_or_else(|| CommandError::runtime(format!("item '{wanted}' does not exist")))?;
        self.pull(depth, buffer)
    }

    fn find_card_index(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        expect_args(args, 1)?;
        match self.find_card_index_by_name(&args[0]) {
            Some(depth) => buffer.writeln(&format!("{} is card {}.", item_key(&args[0]), depth + 1)),
            None => buffer.writeln(&format!("{} is not in the deck.", item_key(&args[0]))),
        }
        Ok(())
    }

    fn save_command(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        self.deck.save_command(args, buffer)
    }

    fn load_command(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        self.deck.load_command(args, buffer)
    }

    fn capture(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        self.deck.capture(args, buffer)
    }

    fn draw_card(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        self.deck.draw_card(args, buffer)
    }

    fn shuffle(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        self.deck.shuffle(args, buffer)
    }

    fn help(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        describe_command(self, args, buffer)
    }
}

impl Modus for TrueSightDeck {
    const RUNNABLE: bool = false;

    fn create() -> Result<Self, ConfigError> {
        Ok(Self {
            deck: TarotDeck::create()?,
        })
    }

    fn descriptor(&self) -> Result<ModusDescriptor<Self>, ConfigError> {
        ModusDescriptor::<Self>::new("TrueSightDeck")
            .command("save", TrueSightDeck::save_command, "syntax: save")?
            .command("load", TrueSightDeck::load_command, "syntax: load [clear|as-is|no-empty]")?
            .command("capture", TrueSightDeck::capture, "syntax: capture <item>")?
            .command("drawCard", TrueSightDeck::draw_card, "syntax: drawCard")?
            .command("shuffle", TrueSightDeck::shuffle, "syntax: shuffle")?
            .command(
                "takeOutCardByIndex",
                TrueSightDeck::take_out_card_by_index,
                "syntax: takeOutCardByIndex <index>\n\u{2022} index 1 is the top of the deck.",
            )?
            .command(
                "takeOutCardByName",
                TrueSightDeck::take_out_card_by_name,
                "syntax: takeOutCardByName <item>",
            )?
            .command(
                "findCardIndexByName",
                TrueSightDeck::find_card_index,
                "syntax: findCardIndexByName <item>",
            )?
            .command("help", TrueSightDeck::help, "syntax: help <command>")
    }

    fn load(&mut self, buffer: &mut ModusBuffer) -> CommandResult {
        self.deck.load_with(buffer)
    }

    fn to_deck(&self) -> Vec<Card> {
        self.deck.to_deck()
    }

    fn draw_to_display(&mut self, buffer: &mut ModusBuffer) {
        buffer.show(self.deck.view("TrueSightDeck"));
    }

    fn description(&self) -> String {
        format!(
            "{}\nThe TrueSightDeck can see every face, so cards may be taken from any depth.",
            TarotDeck::DESCRIPTION
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sylladex_core::{instantiate, ActiveModus, DisplayBuffer, TextLog};

    fn buffer() -> ModusBuffer {
        ModusBuffer::new(DisplayBuffer::new(), TextLog::new())
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn stocked() -> (TrueSightDeck, ModusBuffer) {
        let mut buffer = buffer();
        let mut deck = TrueSightDeck::with_seed(11);
        for item in ["sword", "shield", "potion"] {
            deck.capture(&args(&[item]), &mut buffer).expect("capture");
        }
        (deck, buffer)
    }

    #[test]
    fn index_counts_from_the_top() {
        let (mut deck, mut buffer) = stocked();
        assert_eq!(deck.find_card_index_by_name("potion"), Some(0));
        assert_eq!(deck.find_card_index_by_name("SWORD"), Some(2));
        assert_eq!(deck.find_card_index_by_name("sheild"), Some(1));
        deck.take_out_card_by_index(&args(&["2"]), &mut buffer)
            .expect("take");
        assert_eq!(buffer.open_hand().snapshot(), vec!["SHIELD".to_string()]);
        assert_eq!(deck.inner().len(), 2);
    }

    macro_rules! index_error_case {
        ($name:ident, $index:expr, $message:expr) => {
            #[test]
            fn $name() {
                let (mut deck, mut buffer) = stocked();
                assert_eq!(
                    deck.take_out_card_by_index(&args(&[$index]), &mut buffer),
                    Err(CommandError::runtime($message))
                );
            }
        };
    }

    index_error_case!(index_zero, "0", "0 is not a valid index");
    index_error_case!(index_past_bottom, "4", "4 is not a valid index");
    index_error_case!(index_not_number, "top", "top is not a number");

    #[test]
    fn take_by_name_accepts_near_misses() {
        let (mut deck, mut buffer) = stocked();
        deck.take_out_card_by_name(&args(&["potoin"]), &mut buffer)
            .expect("take");
        assert_eq!(buffer.open_hand().snapshot(), vec!["POTION".to_string()]);
        assert_eq!(
            deck.take_out_card_by_name(&args(&["lantern"]), &mut buffer),
            Err(CommandError::runtime("item 'LANTERN' does not exist"))
        );
    }

    #[test]
    fn instantiates_but_is_not_runnable() {
        let metadata = instantiate::<TrueSightDeck>().expect("instantiate");
        assert!(metadata.is_valid());
        assert!(!<TrueSightDeck as Modus>::RUNNABLE);
        assert!(metadata
            .command_names()
            .contains(&"takeOutCardByIndex".to_string()));
    }
}
