use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::game::{HandComplete, Phase, ShowdownEntry};
use crate::hand::Category;
use crate::player::PlayerId;
use crate::pot::Payout;
use crate::rules::ValidatedAction;

/// Records a single resolved action during a hand.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub player_id: PlayerId,
    /// The phase when this action occurred
    pub phase: Phase,
    /// The action after stack capping
    pub action: ValidatedAction,
}

/// Complete record of a hand, serialized one per line (JSONL).
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    /// Unique identifier for this hand (format: YYYYMMDD-NNNNNN)
    pub hand_id: String,
    /// Seed of the table RNG, if the table was seeded
    pub seed: Option<u64>,
    pub actions: Vec<ActionRecord>,
    pub board: Vec<Card>,
    pub winners: Vec<PlayerId>,
    #[serde(default)]
    pub hand_rank: Option<Category>,
    pub payouts: Vec<Payout>,
    /// Timestamp when the hand was played (RFC3339 format)
    #[serde(default)]
    pub ts: Option<String>,
    /// Present only when the hand reached showdown
    #[serde(default)]
    pub showdown: Option<Vec<ShowdownEntry>>,
}

impl HandRecord {
    pub fn from_hand(
        hand_id: String,
        seed: Option<u64>,
        actions: &[ActionRecord],
        result: &HandComplete,
    ) -> Self {
        Self {
            hand_id,
            seed,
            actions: actions.to_vec(),
            board: result.board.clone(),
            winners: result.winners.clone(),
            hand_rank: result.hand_rank,
            payouts: result.payouts.clone(),
            ts: None,
            showdown: result.showdown.clone(),
        }
    }
}

pub fn format_hand_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

/// Appends [`HandRecord`]s to a JSONL file.
pub struct HandLogger {
    writer: Option<BufWriter<File>>,
    date: String,
    seq: u32,
}

impl HandLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = File::create(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            date: Utc::now().format("%Y%m%d").to_string(),
            seq: 0,
        })
    }

    /// A logger that numbers hands but writes nowhere.
    pub fn detached(date: &str) -> Self {
        Self {
            writer: None,
            date: date.to_string(),
            seq: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_hand_id(&self.date, self.seq)
    }

    pub fn write(&mut self, record: &HandRecord) -> std::io::Result<()> {
        // inject timestamp if missing
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}
