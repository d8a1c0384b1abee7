//! Reference catalog loading.
//!
//! Every token change (including the first token) starts a new load
//! generation. The two fetches for that generation run independently and in
//! any order; each result is tagged with the generation it was issued under.
//! `apply` drops results from older generations, so a slow response for a
//! superseded token can never overwrite a catalog fetched for the current one.
//!
//! A successful fetch replaces its catalog wholesale. A failed fetch is logged
//! and leaves the catalog as it was.

use tracing::{info, warn};

use crate::api::{ApiError, BacktestApi, BearerToken};
use crate::domain::{Catalogs, Coin, Indicator};

/// Which catalog an update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Coins,
    Indicators,
}

impl CatalogKind {
    pub fn label(self) -> &'static str {
        match self {
            CatalogKind::Coins => "coins",
            CatalogKind::Indicators => "indicators",
        }
    }
}

/// Permission to fetch both catalogs for one generation.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    pub generation: u64,
    pub token: BearerToken,
}

/// Result of one catalog fetch, tagged with its generation.
#[derive(Debug, Clone)]
pub enum CatalogUpdate {
    Coins {
        generation: u64,
        result: Result<Vec<Coin>, ApiError>,
    },
    Indicators {
        generation: u64,
        result: Result<Vec<Indicator>, ApiError>,
    },
}

impl CatalogUpdate {
    pub fn generation(&self) -> u64 {
        match self {
            CatalogUpdate::Coins { generation, .. } | CatalogUpdate::Indicators { generation, .. } => {
                *generation
            }
        }
    }

    pub fn kind(&self) -> CatalogKind {
        match self {
            CatalogUpdate::Coins { .. } => CatalogKind::Coins,
            CatalogUpdate::Indicators { .. } => CatalogKind::Indicators,
        }
    }
}

/// What `apply` did with an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Replaced { kind: CatalogKind, count: usize },
    Stale { kind: CatalogKind, generation: u64 },
    Failed { kind: CatalogKind, error: ApiError },
}

#[derive(Debug, Default)]
pub struct ReferenceDataLoader {
    generation: u64,
    last_token: Option<BearerToken>,
    catalogs: Catalogs,
}

impl ReferenceDataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a new generation if `token` differs from the last token seen.
    pub fn on_token(&mut self, token: &BearerToken) -> Option<LoadTicket> {
        if self.last_token.as_ref() == Some(token) {
            return None;
        }
        Some(self.reload(token))
    }

    /// Start a new generation unconditionally.
    pub fn reload(&mut self, token: &BearerToken) -> LoadTicket {
        self.generation += 1;
        self.last_token = Some(token.clone());
        LoadTicket {
            generation: self.generation,
            token: token.clone(),
        }
    }

    /// Apply one fetch result.
    pub fn apply(&mut self, update: CatalogUpdate) -> ApplyOutcome {
        let kind = update.kind();
        let generation = update.generation();
        if generation != self.generation {
            warn!(
                catalog = kind.label(),
                generation,
                current = self.generation,
                "dropping stale catalog response"
            );
            return ApplyOutcome::Stale { kind, generation };
        }

        let replaced = match update {
            CatalogUpdate::Coins { result, .. } => result.map(|coins| {
                let count = coins.len();
                self.catalogs.coins = coins;
                count
            }),
            CatalogUpdate::Indicators { result, .. } => result.map(|indicators| {
                let count = indicators.len();
                self.catalogs.indicators = indicators;
                count
            }),
        };

        match replaced {
            Ok(count) => {
                info!(catalog = kind.label(), count, "catalog loaded");
                ApplyOutcome::Replaced { kind, count }
            }
            Err(error) => {
                warn!(catalog = kind.label(), %error, "error fetching catalog");
                ApplyOutcome::Failed { kind, error }
            }
        }
    }

    /// Fetch and apply both catalogs on the calling thread.
    pub fn load_blocking<A: BacktestApi + ?Sized>(
        &mut self,
        api: &A,
        token: &BearerToken,
    ) -> [ApplyOutcome; 2] {
        let ticket = self.reload(token);
        let coins = self.apply(fetch_coins_update(api, &ticket));
        let indicators = self.apply(fetch_indicators_update(api, &ticket));
        [coins, indicators]
    }

    /// Fetch and apply a single catalog on the calling thread. The other
    /// catalog is neither requested nor touched.
    pub fn load_one_blocking<A: BacktestApi + ?Sized>(
        &mut self,
        api: &A,
        token: &BearerToken,
        kind: CatalogKind,
    ) -> ApplyOutcome {
        let ticket = self.reload(token);
        let update = match kind {
            CatalogKind::Coins => fetch_coins_update(api, &ticket),
            CatalogKind::Indicators => fetch_indicators_update(api, &ticket),
        };
        self.apply(update)
    }
}

/// Run the coin fetch for a ticket.
pub fn fetch_coins_update<A: BacktestApi + ?Sized>(api: &A, ticket: &LoadTicket) -> CatalogUpdate {
    CatalogUpdate::Coins {
        generation: ticket.generation,
        result: api.fetch_coins(&ticket.token),
    }
}

/// Run the indicator fetch for a ticket.
pub fn fetch_indicators_update<A: BacktestApi + ?Sized>(
    api: &A,
    ticket: &LoadTicket,
) -> CatalogUpdate {
    CatalogUpdate::Indicators {
        generation: ticket.generation,
        result: api.fetch_indicators(&ticket.token),
    }
}
