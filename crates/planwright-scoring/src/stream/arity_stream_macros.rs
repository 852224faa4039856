// Macros generating the arity-specific constraint streams.
//
// Every stream wraps the node built so far. The operations shared by all
// arities (filter, semi-joins, grouping, terminal impacts) come from
// `impl_arity_stream!`; `impl_stream_join!` adds `join` to the streams
// whose arity can still grow.

macro_rules! impl_arity_stream {
    ($stream:ident) => {
        pub struct $stream<S, N, Sc> {
            pub(crate) node: N,
            pub(crate) _phantom: std::marker::PhantomData<(fn(&S), fn() -> Sc)>,
        }

        impl<S, N, Sc> $stream<S, N, Sc> {
            pub(crate) fn from_node(node: N) -> Self {
                Self {
                    node,
                    _phantom: std::marker::PhantomData,
                }
            }
        }

        impl<S, N, Sc> $stream<S, N, Sc>
        where
            S: Send + Sync + 'static,
            N: $crate::node::Node<S>,
            Sc: planwright_core::score::Score,
        {
            // Keeps the rows satisfying `predicate`.
            pub fn filter<P>(self, predicate: P) -> $stream<S, $crate::node::FilterNode<N, P>, Sc>
            where
                P: $crate::stream::tuple::TupleFn<N::Out, bool>,
            {
                $stream::from_node($crate::node::FilterNode::new(self.node, predicate))
            }

            // Keeps the rows with at least one matching fact in `other`.
            //
            // Fails with a configuration error when the joiner list puts an
            // indexing joiner after a filtering joiner.
            pub fn if_exists<R, B, J>(
                self,
                other: $crate::stream::UniConstraintStream<S, R, Sc>,
                joiners: J,
            ) -> planwright_core::Result<
                $stream<S, $crate::node::ExistsNode<N, R, J, N::Out, B>, Sc>,
            >
            where
                R: $crate::node::Node<S, Out = (B,)>,
                B: $crate::stream::tuple::Element,
                J: $crate::stream::joiner::JoinerList<N::Out, B>,
            {
                joiners.validate()?;
                Ok($stream::from_node($crate::node::ExistsNode::new(
                    self.node, other.node, joiners, false,
                )))
            }

            // Keeps the rows with no matching fact in `other`.
            pub fn if_not_exists<R, B, J>(
                self,
                other: $crate::stream::UniConstraintStream<S, R, Sc>,
                joiners: J,
            ) -> planwright_core::Result<
                $stream<S, $crate::node::ExistsNode<N, R, J, N::Out, B>, Sc>,
            >
            where
                R: $crate::node::Node<S, Out = (B,)>,
                B: $crate::stream::tuple::Element,
                J: $crate::stream::joiner::JoinerList<N::Out, B>,
            {
                joiners.validate()?;
                Ok($stream::from_node($crate::node::ExistsNode::new(
                    self.node, other.node, joiners, true,
                )))
            }

            // Groups rows by key and folds each group with `collector`,
            // emitting `(key, result)`.
            pub fn group_by<KF, K, C>(
                self,
                key: KF,
                collector: C,
            ) -> $crate::stream::BiConstraintStream<
                S,
                $crate::node::GroupNode<N, KF, C, $crate::node::KeyAndResult, N::Out, K>,
                Sc,
            >
            where
                KF: $crate::stream::tuple::TupleFn<N::Out, K>,
                K: $crate::stream::tuple::Element + Eq + std::hash::Hash,
                C: $crate::stream::collector::Collector<N::Out>,
            {
                $crate::stream::BiConstraintStream::from_node($crate::node::GroupNode::new(
                    self.node, key, collector,
                ))
            }

            // Emits each distinct key once.
            pub fn group_by_key<KF, K>(
                self,
                key: KF,
            ) -> $crate::stream::UniConstraintStream<
                S,
                $crate::node::GroupNode<
                    N,
                    KF,
                    $crate::stream::collector::CountCollector,
                    $crate::node::KeyOnly,
                    N::Out,
                    K,
                >,
                Sc,
            >
            where
                KF: $crate::stream::tuple::TupleFn<N::Out, K>,
                K: $crate::stream::tuple::Element + Eq + std::hash::Hash,
            {
                $crate::stream::UniConstraintStream::from_node($crate::node::GroupNode::new(
                    self.node,
                    key,
                    $crate::stream::collector::count(),
                ))
            }

            // Folds every row into one global result. An empty stream emits
            // nothing.
            pub fn group_by_collector<C>(
                self,
                collector: C,
            ) -> $crate::stream::UniConstraintStream<
                S,
                $crate::node::GroupNode<
                    N,
                    $crate::stream::tuple::GlobalKey,
                    C,
                    $crate::node::ResultOnly,
                    N::Out,
                    (),
                >,
                Sc,
            >
            where
                C: $crate::stream::collector::Collector<N::Out>,
            {
                $crate::stream::UniConstraintStream::from_node($crate::node::GroupNode::new(
                    self.node,
                    $crate::stream::tuple::GlobalKey,
                    collector,
                ))
            }

            // Penalizes each row by `weight`.
            pub fn penalize(
                self,
                weight: Sc,
            ) -> $crate::stream::ConstraintBuilder<S, N, $crate::stream::tuple::UnitWeight, Sc> {
                $crate::stream::ConstraintBuilder::new(
                    self.node,
                    $crate::stream::tuple::UnitWeight,
                    planwright_core::ImpactType::Penalty,
                    $crate::constraint::ConstraintWeight::Fixed(weight),
                )
            }

            // Penalizes each row by `weight` times the match weight.
            pub fn penalize_with<W>(
                self,
                weight: Sc,
                weigher: W,
            ) -> $crate::stream::ConstraintBuilder<S, N, W, Sc>
            where
                W: $crate::stream::tuple::TupleFn<N::Out, i64>,
            {
                $crate::stream::ConstraintBuilder::new(
                    self.node,
                    weigher,
                    planwright_core::ImpactType::Penalty,
                    $crate::constraint::ConstraintWeight::Fixed(weight),
                )
            }

            pub fn reward(
                self,
                weight: Sc,
            ) -> $crate::stream::ConstraintBuilder<S, N, $crate::stream::tuple::UnitWeight, Sc> {
                $crate::stream::ConstraintBuilder::new(
                    self.node,
                    $crate::stream::tuple::UnitWeight,
                    planwright_core::ImpactType::Reward,
                    $crate::constraint::ConstraintWeight::Fixed(weight),
                )
            }

            pub fn reward_with<W>(
                self,
                weight: Sc,
                weigher: W,
            ) -> $crate::stream::ConstraintBuilder<S, N, W, Sc>
            where
                W: $crate::stream::tuple::TupleFn<N::Out, i64>,
            {
                $crate::stream::ConstraintBuilder::new(
                    self.node,
                    weigher,
                    planwright_core::ImpactType::Reward,
                    $crate::constraint::ConstraintWeight::Fixed(weight),
                )
            }

            // Adds `weight` times the match weight, which may be negative.
            pub fn impact_with<W>(
                self,
                weight: Sc,
                weigher: W,
            ) -> $crate::stream::ConstraintBuilder<S, N, W, Sc>
            where
                W: $crate::stream::tuple::TupleFn<N::Out, i64>,
            {
                $crate::stream::ConstraintBuilder::new(
                    self.node,
                    weigher,
                    planwright_core::ImpactType::Mixed,
                    $crate::constraint::ConstraintWeight::Fixed(weight),
                )
            }

            // Penalizes each row by `weight` times a decimal match weight.
            pub fn penalize_decimal_with<W>(
                self,
                weight: Sc,
                weigher: W,
            ) -> $crate::stream::ConstraintBuilder<S, N, W, Sc, planwright_core::Decimal>
            where
                W: $crate::stream::tuple::TupleFn<N::Out, planwright_core::Decimal>,
            {
                $crate::stream::ConstraintBuilder::new(
                    self.node,
                    weigher,
                    planwright_core::ImpactType::Penalty,
                    $crate::constraint::ConstraintWeight::Fixed(weight),
                )
            }

            pub fn reward_decimal_with<W>(
                self,
                weight: Sc,
                weigher: W,
            ) -> $crate::stream::ConstraintBuilder<S, N, W, Sc, planwright_core::Decimal>
            where
                W: $crate::stream::tuple::TupleFn<N::Out, planwright_core::Decimal>,
            {
                $crate::stream::ConstraintBuilder::new(
                    self.node,
                    weigher,
                    planwright_core::ImpactType::Reward,
                    $crate::constraint::ConstraintWeight::Fixed(weight),
                )
            }

            pub fn impact_decimal_with<W>(
                self,
                weight: Sc,
                weigher: W,
            ) -> $crate::stream::ConstraintBuilder<S, N, W, Sc, planwright_core::Decimal>
            where
                W: $crate::stream::tuple::TupleFn<N::Out, planwright_core::Decimal>,
            {
                $crate::stream::ConstraintBuilder::new(
                    self.node,
                    weigher,
                    planwright_core::ImpactType::Mixed,
                    $crate::constraint::ConstraintWeight::Fixed(weight),
                )
            }

            pub fn penalize_configurable_decimal_with<W>(
                self,
                weigher: W,
            ) -> $crate::stream::ConstraintBuilder<S, N, W, Sc, planwright_core::Decimal>
            where
                W: $crate::stream::tuple::TupleFn<N::Out, planwright_core::Decimal>,
            {
                $crate::stream::ConstraintBuilder::new(
                    self.node,
                    weigher,
                    planwright_core::ImpactType::Penalty,
                    $crate::constraint::ConstraintWeight::Configurable,
                )
            }

            // Penalizes each row by a weight configured per working solution.
            pub fn penalize_configurable(
                self,
            ) -> $crate::stream::ConstraintBuilder<S, N, $crate::stream::tuple::UnitWeight, Sc> {
                $crate::stream::ConstraintBuilder::new(
                    self.node,
                    $crate::stream::tuple::UnitWeight,
                    planwright_core::ImpactType::Penalty,
                    $crate::constraint::ConstraintWeight::Configurable,
                )
            }

            pub fn penalize_configurable_with<W>(
                self,
                weigher: W,
            ) -> $crate::stream::ConstraintBuilder<S, N, W, Sc>
            where
                W: $crate::stream::tuple::TupleFn<N::Out, i64>,
            {
                $crate::stream::ConstraintBuilder::new(
                    self.node,
                    weigher,
                    planwright_core::ImpactType::Penalty,
                    $crate::constraint::ConstraintWeight::Configurable,
                )
            }

            pub fn reward_configurable(
                self,
            ) -> $crate::stream::ConstraintBuilder<S, N, $crate::stream::tuple::UnitWeight, Sc> {
                $crate::stream::ConstraintBuilder::new(
                    self.node,
                    $crate::stream::tuple::UnitWeight,
                    planwright_core::ImpactType::Reward,
                    $crate::constraint::ConstraintWeight::Configurable,
                )
            }

            pub fn reward_configurable_with<W>(
                self,
                weigher: W,
            ) -> $crate::stream::ConstraintBuilder<S, N, W, Sc>
            where
                W: $crate::stream::tuple::TupleFn<N::Out, i64>,
            {
                $crate::stream::ConstraintBuilder::new(
                    self.node,
                    weigher,
                    planwright_core::ImpactType::Reward,
                    $crate::constraint::ConstraintWeight::Configurable,
                )
            }
        }

        impl<S, N, Sc> std::fmt::Debug for $stream<S, N, Sc> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($stream)).finish()
            }
        }
    };
}

macro_rules! impl_stream_join {
    ($stream:ident => $next:ident) => {
        impl<S, N, Sc> $stream<S, N, Sc>
        where
            S: Send + Sync + 'static,
            N: $crate::node::Node<S>,
            Sc: planwright_core::score::Score,
        {
            // Crosses each row with the matching facts of `other`, appending
            // the fact to the row.
            //
            // Indexing joiners must precede filtering joiners; any other
            // order is rejected here, before a single row flows.
            pub fn join<R, B, J>(
                self,
                other: $crate::stream::UniConstraintStream<S, R, Sc>,
                joiners: J,
            ) -> planwright_core::Result<$next<S, $crate::node::JoinNode<N, R, J, N::Out, B>, Sc>>
            where
                R: $crate::node::Node<S, Out = (B,)>,
                B: $crate::stream::tuple::Element,
                N::Out: $crate::stream::tuple::Append<B>,
                J: $crate::stream::joiner::JoinerList<N::Out, B>,
            {
                joiners.validate()?;
                tracing::trace!(
                    event = "join_built",
                    stream = stringify!($stream),
                    joiners = ?joiners.kinds(),
                );
                Ok($next::from_node($crate::node::JoinNode::new(
                    self.node, other.node, joiners,
                )))
            }
        }
    };
}

pub(crate) use impl_arity_stream;
pub(crate) use impl_stream_join;
