// Tri-constraint stream.

use super::arity_stream_macros::{impl_arity_stream, impl_stream_join};
use super::QuadConstraintStream;

impl_arity_stream!(TriConstraintStream);
impl_stream_join!(TriConstraintStream => QuadConstraintStream);
