use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Video;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Request, Validate, Transform }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Request => "request",
        Phase::Validate => "validate",
        Phase::Transform => "transform",
    }}
    fn span(&self) -> Span { match self {
        Phase::Request => info_span!("request"),
        Phase::Validate => info_span!("validate"),
        Phase::Transform => info_span!("transform"),
    }}
}

impl OpMarker for Video {
    const NAME: &'static str = "video";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("video") }
}
