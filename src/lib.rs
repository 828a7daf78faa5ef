//! # circuitwatch
//!
//! A live dashboard for circuit breakers and thread pools, fed by periodic
//! snapshots of flat, dot-delimited gauge metrics.
//!
//! Each snapshot is resolved into two kinds of entity: a **circuit** (one
//! `service.method` call path protected by a breaker) and a **thread pool**
//! (the bulkhead executing a service's calls). Every entity gets a widget
//! that derives its rates, error percentages, breaker status and latency
//! percentiles, keeps a short rate history for its sparkline, and draws
//! itself onto a [`Surface`]. The widgets of each kind are kept in a
//! user-selected sort order.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ┌─────────┐    ┌───────────┐    ┌──────────┐    ┌────────┐ │
//! │  │ source  │───▶│ dashboard │───▶│ surface  │───▶│   ui   │ │
//! │  │ (input) │    │ (widgets) │    │(TileBoard)    │(ratatui)│ │
//! │  └─────────┘    └─────┬─────┘    └──────────┘    └────────┘ │
//! │                       │                                     │
//! │          metrics ◀────┴────▶ registry, sort                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`metrics`]**: snapshot model, key resolution, derived circuit and
//!   thread-pool data, sparkline history
//! - **[`dashboard`]**: the aggregate that owns resolver, registry, sort
//!   selections and surface
//! - **[`surface`]**: the rendering capability widgets draw through, and
//!   [`TileBoard`], the retained implementation the terminal UI reads
//! - **[`source`]**: [`DataSource`] trait with file, stream and channel inputs
//! - **[`app`]**, **[`events`]**, **[`ui`]**: the terminal front-end
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a JSON snapshot file
//! circuitwatch --file metrics.json
//!
//! # Read newline-delimited snapshots from TCP
//! circuitwatch --connect localhost:9090
//! ```
//!
//! ### As a library
//!
//! ```
//! use circuitwatch::{Dashboard, DashboardConfig, EntityKind, MetricSnapshot, SortMetric, TileBoard};
//!
//! let mut dashboard = Dashboard::new(TileBoard::new(), DashboardConfig::default());
//! dashboard.init("main");
//!
//! let snapshot = MetricSnapshot::new()
//!     .with_gauge("gauge.hystrix.HystrixCommand.svcA.readX.requestCount", 100)
//!     .with_gauge("gauge.hystrix.HystrixCommand.svcA.readX.errorPercentage", 2.5);
//! dashboard.refresh(&snapshot);
//!
//! dashboard.sort_by(EntityKind::Circuit, SortMetric::Error);
//! let tiles = dashboard.surface().tiles(EntityKind::Circuit);
//! assert_eq!(tiles[0].title, "svcA.readX");
//! ```
//!
//! ### Embedding with a channel source
//!
//! ```
//! use circuitwatch::{App, ChannelSource, MetricSnapshot, Settings, ThemeChoice};
//!
//! let settings = Settings { theme: ThemeChoice::Dark, ..Settings::default() };
//! let (tx, source) = ChannelSource::create("embedded");
//! let mut app = App::new(Box::new(source), &settings);
//!
//! tx.send(MetricSnapshot::new()).unwrap();
//! app.reload_data();
//! ```

pub mod app;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod metrics;
pub mod registry;
pub mod sort;
pub mod source;
pub mod surface;
pub mod ui;
pub mod widget;

pub use app::App;
pub use config::{DashboardConfig, Settings, ThemeChoice};
pub use dashboard::{Dashboard, DashboardReport};
pub use error::{Error, Result};
pub use metrics::{EntityKey, EntityKind, MetricSnapshot, NamingScheme};
pub use sort::{Direction, SortMetric, SortSelection};
pub use source::{ChannelSource, DataSource, FileSource, StreamSource};
pub use surface::{Surface, Tile, TileBoard};
pub use widget::{EntityWidget, Widget, WidgetReport};
