use crate::common::{describe_command, expect_args};
use crate::rng::RngState;
use sylladex_core::{
    Card, CommandError, CommandResult, ConfigError, Continuation, InventoryView, Modus,
    ModusBuffer, ModusDescriptor,
};

/// Riffle passes per shuffle.
pub const SHUFFLE_PASSES: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TarotLoadMode {
    Clear,
    AsIs,
    NoEmpty,
}

impl TarotLoadMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().trim_matches('`').to_lowercase().as_str() {
            "clear" => Some(Self::Clear),
            "as-is" => Some(Self::AsIs),
            "no-empty" | "non-empty" => Some(Self::NoEmpty),
            _ => None,
        }
    }
}

/// A face-down stack. Captures go on top and the only way out is a draw
/// from the top after a full shuffle.
#[derive(Debug, Clone)]
pub struct TarotDeck {
    /// Bottom first; the top card is the last element.
    stack: Vec<Card>,
    rng: RngState,
}

impl TarotDeck {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            stack: Vec::new(),
            rng: RngState::from_seed(seed),
        }
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn top(&self) -> Option<&Card> {
        self.stack.last()
    }

    /// Cards from the top down.
    pub fn cards(&self) -> impl Iterator<Item = &Card> + '_ {
        self.stack.iter().rev()
    }

    pub(crate) fn push_item(&mut self, item: &str) -> CommandResult {
        let card = Card::new(item)
            .map_err(|_| CommandError::runtime(format!("item '{item}' created invalid card")))?;
        self.stack.push(card);
        Ok(())
    }

    pub(crate) fn remove_from_top(&mut self, depth: usize) -> Option<Card> {
        let position = self.stack.len().checked_sub(depth + 1)?;
        Some(self.stack.remove(position))
    }

    /// Splits the stack in half and drops cards back from either half, the
    /// fuller half being proportionally more likely. Returns the trace of
    /// which half each card came from, or `None` when there is nothing to
    /// shuffle.
    pub(crate) fn riffle(&mut self) -> Option<String> {
        if self.stack.len() < 2 {
            return None;
        }
        let mut trace = String::new();
        for _ in 0..SHUFFLE_PASSES {
            let half = self.stack.len() / 2;
            let mut left = self.stack.split_off(self.stack.len() - half);
            left.reverse();
            let mut right = std::mem::take(&mut self.stack);
            right.reverse();
            while !left.is_empty() || !right.is_empty() {
                let total = (left.len() + right.len()) as f64;
                let left_odds = ((left.len() as f64 / total) * 100.0 + 0.5) as u32;
                let from_left =
                    !left.is_empty() && (right.is_empty() || self.rng.percent() < left_odds);
                let card = if from_left { left.pop() } else { right.pop() };
                if let Some(card) = card {
                    self.stack.push(card);
                }
                trace.push(if from_left { '/' } else { '\\' });
            }
            trace.push('_');
        }
        Some(trace)
    }

    pub(crate) fn shuffle_into(&mut self, buffer: &mut ModusBuffer) -> bool {
        buffer.write("Shuffling deck...");
        match self.riffle() {
            Some(trace) => {
                buffer.mark_changed();
                buffer.write(&trace);
                buffer.writeln("success.");
                true
            }
            None => {
                buffer.writeln("not enough cards to shuffle.");
                false
            }
        }
    }

    pub(crate) fn save_command(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        if !args.is_empty() {
            tracing::warn!(args = args.len(), "save ignores its arguments");
        }
        Modus::save(self, buffer);
        buffer.mark_changed();
        Ok(())
    }

    pub(crate) fn load_command(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        if args.len() > 1 {
            return Err(CommandError::arg_count(args.len()));
        }
        buffer.set_modus_input(args.first().cloned().unwrap_or_default());
        Modus::load(self, buffer)
    }

    pub(crate) fn capture(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        expect_args(args, 1)?;
        buffer.write(&format!("Attempting to capture {}...", args[0]));
        self.push_item(&args[0])?;
        buffer.mark_changed();
        buffer.writeln("success.");
        Ok(())
    }

    pub(crate) fn draw_card(&mut self, _args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        if self.stack.is_empty() {
            buffer.writeln("Deck is empty...nothing to draw from!");
            return Ok(());
        }
        self.shuffle_into(buffer);
        if let Some(card) = self.stack.pop() {
            buffer.mark_changed();
            tracing::debug!(item = card.item(), "drew card");
            if card.in_use() {
                buffer.open_hand().push(card.item());
                buffer.writeln(&format!("Retrieved item {} from card.", card.item()));
            }
        }
        Ok(())
    }

    pub(crate) fn shuffle(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        if !args.is_empty() {
            tracing::warn!(args = args.len(), "shuffle ignores its arguments");
        }
        self.shuffle_into(buffer);
        Ok(())
    }

    fn help(&mut self, args: &[String], buffer: &mut ModusBuffer) -> CommandResult {
        describe_command(self, args, buffer)
    }

    pub(crate) fn load_with(&mut self, buffer: &mut ModusBuffer) -> CommandResult {
        let input = buffer.take_modus_input();
        if input.trim().is_empty() {
            buffer.writeln("Please submit a loading mode: `clear`, `as-is`, or `no-empty`.");
            buffer.set_redirector(Continuation::Load);
            return Ok(());
        }
        let Some(mode) = TarotLoadMode::parse(&input) else {
            return Err(CommandError::runtime(format!(
                "No matching mode found from given input: {}",
                input.trim()
            )));
        };
        let deck = buffer.deck().snapshot();
        let kept = deck.into_iter().filter(|card| match mode {
            TarotLoadMode::Clear => false,
            TarotLoadMode::AsIs => card.is_valid(),
            TarotLoadMode::NoEmpty => card.is_valid() && card.in_use(),
        });
        // The shared deck lists the top card first.
        let mut stack: Vec<Card> = kept.collect();
        stack.reverse();
        self.stack = stack;
        buffer.mark_changed();
        buffer.writeln(&format!("Loaded {} cards.", self.stack.len()));
        Ok(())
    }

    pub(crate) fn view(&self, title: &str) -> InventoryView {
        InventoryView::new(title).with_group("deck", self.cards().cloned().collect())
    }

    pub(crate) const DESCRIPTION: &'static str =
        "The TarotDeck Fetch Modus is designed to simulate a mystical deck of cards.\n\
         The deck may start with no cards and will fill and lose cards as you capture and draw \
         cards, respectively. Capturing items will place them at the top of the deck.\n\
         The notable quirk of this modus is that the deck must be shuffled before you draw a \
         card, and you must draw only from the top of the deck.\n\
         The deck will be shuffled 9 times with the riffle shuffle for each time it is to be shuffled.";
}

impl Modus for TarotDeck {
    const RUNNABLE: bool = true;

    fn create() -> Result<Self, ConfigError> {
        let rng = RngState::from_entropy();
        tracing::debug!(seed = rng.seed(), "tarot deck seeded");
        Ok(Self {
            stack: Vec::new(),
            rng,
        })
    }

    fn descriptor(&self) -> Result<ModusDescriptor<Self>, ConfigError> {
        ModusDescriptor::<Self>::new("TarotDeck")
            .command(
                "save",
                TarotDeck::save_command,
                "syntax: save\n\u{2022} saves the current inventory to the sylladex's deck.",
            )?
            .command(
                "load",
                TarotDeck::load_command,
                "syntax: load [mode]\n\u{2022} loads the inventory from the sylladex, which may differ.\
                 \n\u{2022} mode `clear` will reset the modus inventory to an empty deck.\
                 \n\u{2022} mode `as-is` keeps the deck order, *including* empty cards.\
                 \n\u{2022} mode `no-empty` keeps the deck order, *without* any empty cards.",
            )?
            .command(
                "capture",
                TarotDeck::capture,
                "syntax: capture <item>\n\u{2022} captchalogues the item. puts it at the top of the deck.",
            )?
            .command(
                "drawCard",
                TarotDeck::draw_card,
                "syntax: drawCard\n\u{2022} shuffles the deck 9 times, then draws the top card from the deck.",
            )?
            .command(
                "shuffle",
                TarotDeck::shuffle,
                "syntax: shuffle\n\u{2022} shuffles the deck 9 times.",
            )?
            .command(
                "help",
                TarotDeck::help,
                "syntax: help <command>\n\u{2022} describes the given command.",
            )
    }

    fn load(&mut self, buffer: &mut ModusBuffer) -> CommandResult {
        self.load_with(buffer)
    }

    fn to_deck(&self) -> Vec<Card> {
        self.cards().cloned().collect()
    }

    fn draw_to_display(&mut self, buffer: &mut ModusBuffer) {
        buffer.show(self.view("TarotDeck"));
    }

    fn description(&self) -> String {
        Self::DESCRIPTION.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sylladex_core::{DisplayBuffer, TextLog};

    fn buffer() -> (ModusBuffer, TextLog) {
        let log = TextLog::new();
        (ModusBuffer::new(DisplayBuffer::new(), log.clone()), log)
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn items(deck: &TarotDeck) -> Vec<String> {
        deck.cards().map(|card| card.item().to_string()).collect()
    }

    #[test]
    fn capture_goes_on_top() {
        let (mut buffer, _) = buffer();
        let mut deck = TarotDeck::with_seed(1);
        deck.capture(&args(&["cup"]), &mut buffer).expect("cup");
        deck.capture(&args(&["wand"]), &mut buffer).expect("wand");
        assert_eq!(items(&deck), vec!["WAND", "CUP"]);
        assert_eq!(deck.to_deck()[0].item(), "WAND");
    }

    #[test]
    fn shuffle_keeps_every_card() {
        let (mut buffer, log) = buffer();
        let mut deck = TarotDeck::with_seed(7);
        for item in ["a", "b", "c", "d", "e", "f"] {
            deck.capture(&args(&[item]), &mut buffer).expect("capture");
        }
        deck.shuffle(&[], &mut buffer).expect("shuffle");
        let mut after = items(&deck);
        after.sort();
        assert_eq!(after, vec!["A", "B", "C", "D", "E", "F"]);
        let text = log.contents();
        assert_eq!(text.matches('_').count(), SHUFFLE_PASSES);
        assert!(text.ends_with("success.\n"));
    }

    #[test]
    fn same_seed_same_shuffle() {
        let (mut buffer, _) = buffer();
        let mut a = TarotDeck::with_seed(99);
        let mut b = TarotDeck::with_seed(99);
        for item in ["a", "b", "c", "d", "e"] {
            a.capture(&args(&[item]), &mut buffer).expect("capture");
            b.capture(&args(&[item]), &mut buffer).expect("capture");
        }
        assert_eq!(a.riffle(), b.riffle());
        assert_eq!(items(&a), items(&b));
    }

    #[test]
    fn single_card_is_not_shuffled_but_can_be_drawn() {
        let (mut buffer, log) = buffer();
        let mut deck = TarotDeck::with_seed(3);
        deck.capture(&args(&["orb"]), &mut buffer).expect("capture");
        deck.draw_card(&[], &mut buffer).expect("draw");
        assert!(deck.is_empty());
        assert_eq!(buffer.open_hand().snapshot(), vec!["ORB".to_string()]);
        let text = log.contents();
        assert!(text.contains("not enough cards to shuffle."));
        assert!(text.contains("Retrieved item ORB from card."));
    }

    #[test]
    fn drawing_from_empty_deck_is_harmless() {
        let (mut buffer, log) = buffer();
        let mut deck = TarotDeck::with_seed(3);
        deck.draw_card(&[], &mut buffer).expect("draw");
        assert!(log.contents().contains("Deck is empty...nothing to draw from!"));
        assert!(buffer.open_hand().is_empty());
        assert!(!buffer.take_changed());
    }

    macro_rules! load_mode_case {
        ($name:ident, $mode:expr, $expected:expr) => {
            #[test]
            fn $name() {
                let (mut buffer, _) = buffer();
                buffer.deck().replace(vec![
                    Card::new("top").expect("card"),
                    Card::empty(),
                    Card::new("bottom").expect("card"),
                ]);
                let mut deck = TarotDeck::with_seed(5);
                buffer.set_modus_input($mode);
                deck.load(&mut buffer).expect("load");
                let expected: Vec<&str> = $expected;
                assert_eq!(items(&deck), expected);
            }
        };
    }

    load_mode_case!(load_clear, "clear", vec![]);
    load_mode_case!(load_as_is, "`as-is`", vec!["TOP", "EMPTY", "BOTTOM"]);
    load_mode_case!(load_no_empty, "No-Empty", vec!["TOP", "BOTTOM"]);

    #[test]
    fn load_round_trips_through_the_deck() {
        let (mut buffer, _) = buffer();
        let mut deck = TarotDeck::with_seed(5);
        for item in ["one", "two", "three"] {
            deck.capture(&args(&[item]), &mut buffer).expect("capture");
        }
        deck.save(&mut buffer);
        let mut reloaded = TarotDeck::with_seed(6);
        buffer.set_modus_input("as-is");
        reloaded.load(&mut buffer).expect("load");
        assert_eq!(items(&reloaded), items(&deck));
    }

    #[test]
    fn load_prompts_then_rejects_unknown_modes() {
        let (mut buffer, _) = buffer();
        let mut deck = TarotDeck::with_seed(5);
        deck.load(&mut buffer).expect("prompt");
        assert_eq!(buffer.pending(), Some(&Continuation::Load));
        buffer.clear_redirector();
        buffer.set_modus_input("sideways");
        assert_eq!(
            deck.load(&mut buffer),
            Err(CommandError::runtime(
                "No matching mode found from given input: sideways"
            ))
        );
    }
}
