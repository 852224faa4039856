// Quad-constraint stream.

use super::arity_stream_macros::{impl_arity_stream, impl_stream_join};
use super::PentaConstraintStream;

impl_arity_stream!(QuadConstraintStream);
impl_stream_join!(QuadConstraintStream => PentaConstraintStream);
