//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use holdem_engine::player::Personality;
use holdem_engine::pot::UnclaimedPotPolicy;

use crate::config::{Overrides, parse_personalities};

#[derive(Parser, Debug)]
#[command(
    name = "holdem",
    version,
    about = "Texas Hold'em hand evaluation, pot settlement and AI opponents"
)]
pub struct HoldemCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the effective configuration and where each value came from
    Cfg {
        #[command(flatten)]
        table: TableArgs,
    },
    /// Deal one hand to every seat and rank the showdown
    Deal {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(2..=10))]
        players: u8,
    },
    /// Rank five to seven cards, e.g. `holdem eval As Ks Qs Js Ts`
    Eval {
        #[arg(required = true, num_args = 1..)]
        cards: Vec<String>,
        /// Second hand to compare against
        #[arg(long, num_args = 1.., value_delimiter = ' ')]
        against: Option<Vec<String>>,
    },
    /// Play AI-only hands and check chip conservation after each one
    Sim {
        #[arg(long)]
        hands: u64,
        /// Write one JSON line per hand to this file
        #[arg(long)]
        output: Option<String>,
        #[command(flatten)]
        table: TableArgs,
    },
    /// Measure hand evaluation throughput
    Bench {
        #[arg(long, default_value_t = 200)]
        iterations: u64,
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
}

/// Table settings accepted on the command line, layered over file and env.
#[derive(Args, Debug, Clone, Default)]
pub struct TableArgs {
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub starting_stack: Option<u32>,
    #[arg(long)]
    pub small_blind: Option<u32>,
    #[arg(long)]
    pub big_blind: Option<u32>,
    /// Comma separated, one AI seat each: conservative, aggressive, deceptive, mathematician
    #[arg(long, value_parser = personality_list)]
    pub personalities: Option<PersonalityList>,
    #[arg(long, value_enum)]
    pub unclaimed_pot: Option<PotPolicy>,
}

impl TableArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            seed: self.seed,
            starting_stack: self.starting_stack,
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            unclaimed_pot_policy: self.unclaimed_pot.map(PotPolicy::policy),
            personalities: self.personalities.clone().map(|list| list.0),
        }
    }
}

/// Treatment of a side pot none of whose players holds the best hand.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PotPolicy {
    /// Award it to the best hand among its own players
    AwardNextBest,
    /// Carry it into the next hand as dead money
    Retain,
}

impl PotPolicy {
    pub fn policy(self) -> UnclaimedPotPolicy {
        match self {
            PotPolicy::AwardNextBest => UnclaimedPotPolicy::AwardNextBest,
            PotPolicy::Retain => UnclaimedPotPolicy::Retain,
        }
    }
}

/// Seat personalities given as one comma separated argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersonalityList(pub Vec<Personality>);

fn personality_list(s: &str) -> Result<PersonalityList, String> {
    parse_personalities(s)
        .map(PersonalityList)
        .map_err(|e| e.to_string())
}
