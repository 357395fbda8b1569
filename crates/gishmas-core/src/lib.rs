//! # Gishmas Core Library
//!
//! Core logic for the Gishmas seasonal site: the "sus test" guest quiz, its
//! guest storage, and the page flow around it. Everything is usable from the
//! standalone CLI; any other front end renders from the same events.
//!
//! ## Architecture
//!
//! - **Quiz Engine**: a three-question state machine that scores the answers
//!   into a verdict and hands a guest draft to storage
//! - **Storage**: SQLite-backed local key-value cache and TOML configuration
//! - **Remote**: realtime document store port with HTTP and in-memory
//!   adapters, plus identity bootstrap
//! - **Flow**: page router, day grid with unlock policies, and the quiz page
//!
//! ## Key Components
//!
//! - [`QuizMachine`]: quiz state machine
//! - [`score`]: pure scoring over three answers
//! - [`GuestBook`]: local/remote guest persistence per quiz variant
//! - [`QuizPage`]: quiz page with live guest list and result overlay
//! - [`Config`]: application configuration

pub mod context;
pub mod error;
pub mod events;
pub mod flow;
pub mod guest;
pub mod identity;
pub mod quiz;
pub mod remote;
pub mod repository;
pub mod scoring;
pub mod storage;

pub use context::AppContext;
pub use error::{
    ConfigError, CoreError, IdentityError, LocalStorageError, StoreError, ValidationError,
};
pub use events::QuizEvent;
pub use flow::{
    App, DailySpin, DayContent, DayGrid, DaySlot, NavAction, Page, QuizPage, Router,
    UnlockPolicy, GAME_BACK_SIGNAL,
};
pub use guest::{sort_newest_first, Guest, GuestDraft, GuestStatus, SusLevel};
pub use identity::{HttpIdentityProvider, IdentityProvider, UserHandle};
pub use quiz::{AnswerOption, Question, QuizMachine, QuizStep, QuizVariant};
pub use remote::{
    CollectionPath, Document, DocumentStore, HttpDocumentStore, Listener, MemoryDocumentStore,
    Snapshot,
};
pub use repository::{
    GuestBook, GuestRepository, LocalRepository, RemoteRepository, Subscription,
};
pub use scoring::{score, ReasonSet, Verdict};
pub use storage::{data_dir, Config, LocalStorage};
