//! L3 indicator aggregation (spec §4.6): keyword matching, the six
//! calculation types, category/NAI scoring, trend detection, and
//! ensemble forecasting.

pub mod aggregate;
pub mod aggregator;
pub mod calculate;
pub mod error;
pub mod forecast;
pub mod keyword;
pub mod regression;
pub mod trend;

pub use aggregate::{category_scores, category_weight, national_activity_index, CategoryScore, NaiBand};
pub use aggregator::{detect_events, ArticleInput, IndicatorAggregator};
pub use calculate::MatchedArticle;
pub use error::IndicatorError;
pub use forecast::forecast;
pub use keyword::{is_matched, match_score, matches_keyword, score_article, NO_MATCH_THRESHOLD};
pub use regression::{change_points, has_seasonality, linear_regression, rsi_momentum, LinearFit};
pub use trend::detect_trend;
