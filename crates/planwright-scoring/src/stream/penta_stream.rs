// Penta-constraint stream. Five facts is the widest row; there is no join.

use super::arity_stream_macros::impl_arity_stream;

impl_arity_stream!(PentaConstraintStream);
