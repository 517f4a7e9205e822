//! clusterstat - statistical comparison reports for cluster metrics
//!
//! Compares CPU and memory usage of nodes and containers across competing
//! cluster technologies. For every (metric type, source) pair a decision
//! tree picks the right omnibus and post-hoc tests; the results end up as
//! annotated box plots and an HTML summary of medians and dispersions.

pub mod cli;
pub mod decision;
pub mod groups;
pub mod html_output;
pub mod input;
pub mod json_output;
pub mod layout;
pub mod pipeline;
pub mod plot;
pub mod record;
pub mod summary;
