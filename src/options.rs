//! Table configuration options.

use core::time::Duration;

/// Rounding mode for payouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundingMode {
    /// Round up.
    Up,
    /// Round down.
    Down,
    /// Round to nearest.
    Nearest,
}

/// Configuration options for a blackjack table.
///
/// Use the builder pattern to customize options:
///
/// ```
/// use bjtable::TableOptions;
///
/// let options = TableOptions::default()
///     .with_blackjack_pays(1.5)
///     .with_players(2, 4)
///     .with_stand_on_soft_17(true);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableOptions {
    /// Blackjack winnings as a ratio of the bet, on top of the returned stake.
    pub blackjack_pays: f64,
    /// Rounding mode for blackjack payouts.
    pub rounding_blackjack: RoundingMode,
    /// Whether dealer stands on soft 17.
    pub stand_on_soft_17: bool,
    /// Fewest ready participants a shared table starts with.
    pub min_players: usize,
    /// Most participants a shared table seats.
    pub max_players: usize,
    /// How long the current participant may hold the turn.
    pub turn_timeout: Duration,
    /// Pause between settlement and the table reset.
    pub settlement_cooldown: Duration,
    /// Buffered events per subscriber before slow ones start lagging.
    pub event_capacity: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            blackjack_pays: 1.5,
            rounding_blackjack: RoundingMode::Down,
            stand_on_soft_17: true,
            min_players: 2,
            max_players: 4,
            turn_timeout: Duration::from_secs(30),
            settlement_cooldown: Duration::from_secs(5),
            event_capacity: 64,
        }
    }
}

impl TableOptions {
    /// Sets the blackjack payout ratio.
    ///
    /// # Example
    ///
    /// ```
    /// use bjtable::TableOptions;
    ///
    /// let options = TableOptions::default().with_blackjack_pays(1.2);
    /// assert_eq!(options.blackjack_pays, 1.2);
    /// ```
    #[must_use]
    pub const fn with_blackjack_pays(mut self, ratio: f64) -> Self {
        self.blackjack_pays = ratio;
        self
    }

    /// Sets the rounding mode for blackjack payouts.
    #[must_use]
    pub const fn with_rounding_blackjack(mut self, mode: RoundingMode) -> Self {
        self.rounding_blackjack = mode;
        self
    }

    /// Sets whether dealer stands on soft 17.
    ///
    /// # Example
    ///
    /// ```
    /// use bjtable::TableOptions;
    ///
    /// let options = TableOptions::default().with_stand_on_soft_17(false);
    /// assert_eq!(options.stand_on_soft_17, false);
    /// ```
    #[must_use]
    pub const fn with_stand_on_soft_17(mut self, stand: bool) -> Self {
        self.stand_on_soft_17 = stand;
        self
    }

    /// Sets the allowed number of participants at a shared table.
    ///
    /// # Example
    ///
    /// ```
    /// use bjtable::TableOptions;
    ///
    /// let options = TableOptions::default().with_players(2, 3);
    /// assert_eq!((options.min_players, options.max_players), (2, 3));
    /// ```
    #[must_use]
    pub const fn with_players(mut self, min: usize, max: usize) -> Self {
        self.min_players = min;
        self.max_players = max;
        self
    }

    /// Sets how long a participant may hold the turn before it is expired.
    #[must_use]
    pub const fn with_turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout = timeout;
        self
    }

    /// Sets the pause between settlement and reset.
    #[must_use]
    pub const fn with_settlement_cooldown(mut self, cooldown: Duration) -> Self {
        self.settlement_cooldown = cooldown;
        self
    }

    /// Sets the event buffer size.
    #[must_use]
    pub const fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}
