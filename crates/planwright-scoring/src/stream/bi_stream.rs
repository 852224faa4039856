// Bi-constraint stream: rows of two facts, from a join or a group.

use super::arity_stream_macros::{impl_arity_stream, impl_stream_join};
use super::TriConstraintStream;

impl_arity_stream!(BiConstraintStream);
impl_stream_join!(BiConstraintStream => TriConstraintStream);
