//! Scoreguard Core - session, authorization and score interpretation
//!
//! This crate holds the parts of the Scoreguard client that carry real
//! invariants. Everything that talks to the scoring service lives in
//! `scoreguard-client`; everything that draws lives in the binary.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Scoreguard client                     │
//! ├──────────────────────────────────────────────────────────┤
//! │   navigation ──► RouteGuard ──► SessionStore ──► KeyValue │
//! │                                    ▲             Store    │
//! │   ApiClient (401) ─────────────────┘                      │
//! │                                                           │
//! │   ScoreResult ──► GaugeView ──► ScoreDomain               │
//! │                       │                                   │
//! │                       └──► AnimationDriver ──► FrameClock │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - **SessionStore**: the single authenticated identity, restored from and
//!   persisted to a [`KeyValueStore`]
//! - **RouteGuard**: three-state authorization check run on every navigation
//! - **ScoreDomain** ([`score`]): total, pure mapping of a raw score to tier,
//!   colour and gauge percentage
//! - **AnimationDriver**: frame-clock driven, cancellable interpolations
//! - **GaugeView**: owns the gauge's two animations and derives the
//!   [`VisualState`] for each frame

pub mod animation;
pub mod config;
pub mod error;
pub mod gauge;
pub mod guard;
pub mod persistence;
pub mod role;
pub mod score;
pub mod session;

pub use animation::{
    AnimationDriver, AnimationHandle, AnimationKey, Frame, FrameClock, Interpolation, ManualClock,
    SystemClock,
};
pub use config::AppConfig;
pub use error::{Result, ScoreguardError};
pub use gauge::{GaugeView, VisualState};
pub use guard::{GuardState, Navigation, Route, RouteGuard, LOGIN_ENTRY};
pub use persistence::{FileStore, KeyValueStore, KvOp, MemoryStore};
pub use role::{Role, User};
pub use score::{color_tier, percentage, ScoreResult, ScoreTier, Trend};
pub use session::{ClearReason, Session, SessionEvent, SessionStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lowest score the scoring service issues
pub const SCORE_MIN: i64 = 300;

/// Highest score the scoring service issues
pub const SCORE_MAX: i64 = 850;
