//! Derivation of edit rules.
//!
//! From the authored rules, we synthesize rules that recognize input with
//! elided content (insertion rules) and input with the two children of a
//! binary rule swapped (transposition rules). Costs declared by authors drive
//! everything; no elided or reordered variant is written by hand.
//!
//! Insertability is a fixed point over a graph that may contain cycles, so
//! it is computed by repeated passes with explicit convergence detection,
//! much like the RHS closure with values.

use std::cmp::Ordering;

use log::{debug, trace};

use crate::error::Result;
use crate::grammar::Grammar;
use crate::rule::{Child, InsertedChild, Insertion, NonterminalRule, RhsKey, Rule, RuleOrigin};
use crate::semantic::SemanticNode;
use crate::symbol::Symbol;

/// Summary of one derivation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DeriveStats {
    /// Rules rewritten or removed because a child matches only the empty
    /// string.
    pub collapsed: usize,
    /// Insertion rules added.
    pub insertions: usize,
    /// Insertion rules replaced by cheaper ones.
    pub replaced: usize,
    pub transpositions: usize,
    /// Insertion rounds until no rule changed.
    pub rounds: usize,
}

enum Offer {
    Added,
    Replaced,
    Kept,
}

enum Collapsed {
    Rule(NonterminalRule),
    /// No child remains; the LHS matches zero tokens this way.
    ZeroToken(Insertion),
}

impl Grammar {
    /// Synthesizes insertion and transposition rules and collapses rules
    /// with `<empty>` children.
    ///
    /// # Design
    ///
    /// - Q: Can I run this function twice?
    /// - A: Yes, it's idempotent. The second call adds nothing.
    /// - Q: Does the order of authoring matter?
    /// - A: No. Every choice between candidates is made by a total order on
    ///   cost, then display text, then semantics, and derivation runs to a
    ///   fixed point.
    pub fn derive_edit_rules(&mut self) -> Result<DeriveStats> {
        let mut stats = DeriveStats {
            collapsed: self.collapse_empty_rules()?,
            ..DeriveStats::default()
        };

        // A new insertion rule may make its LHS insertable where the LHS is
        // used elsewhere, so repeat until a full round changes nothing.
        let max_rounds = self.num_syms() + 1;
        loop {
            stats.rounds += 1;
            let insertions = self.insertions();
            let (added, replaced) = self.add_insertion_rules(&insertions);
            stats.insertions += added;
            stats.replaced += replaced;
            if added == 0 && replaced == 0 {
                break;
            }
            if stats.rounds >= max_rounds {
                debug!("insertion rules did not settle after {} rounds", stats.rounds);
                break;
            }
        }

        stats.transpositions = self.add_transposition_rules();
        debug!(
            "derived {} insertion, {} transposition and {} collapsed rules in {} rounds",
            stats.insertions, stats.transpositions, stats.collapsed, stats.rounds
        );
        Ok(stats)
    }

    /// Computes the cheapest insertion of every insertable symbol.
    ///
    /// Seeds are `<empty>`, symbols collapsed to zero tokens, and rules with
    /// an explicit insertion cost. A rule whose children can all be inserted
    /// makes its LHS insertable too. Passes are capped by the symbol count.
    pub fn insertions(&self) -> Vec<Option<Insertion>> {
        let num_syms = self.num_syms();
        let mut best: Vec<Option<Insertion>> = vec![None; num_syms];
        best[self.empty_symbol().usize()] = Some(Insertion::default());
        for (index, data) in self.symbols_data().iter().enumerate() {
            if let Some(zero_token) = &data.zero_token {
                offer_insertion(&mut best[index], zero_token.clone());
            }
            for rule in &data.rules {
                if let Rule::Terminal(terminal) = rule {
                    if let Some(cost) = terminal.insertion_cost {
                        let seed = Insertion {
                            cost: cost + terminal.cost_penalty,
                            text: vec![terminal.display_text()],
                            semantics: terminal.semantic.iter().cloned().collect(),
                        };
                        offer_insertion(&mut best[index], seed);
                    }
                }
            }
        }

        for pass in 0..=num_syms {
            let mut changed = false;
            for (index, data) in self.symbols_data().iter().enumerate() {
                let lhs = Symbol::from(index);
                for rule in &data.rules {
                    let rule = match rule {
                        Rule::Nonterminal(rule) if rule.origin != RuleOrigin::Transposition => rule,
                        _ => continue,
                    };
                    if let Some(candidate) = self.rule_insertion(lhs, rule, &best) {
                        changed |= offer_insertion(&mut best[index], candidate);
                    }
                }
            }
            if !changed {
                trace!("insertion costs converged after {} passes", pass + 1);
                break;
            }
        }
        best
    }

    /// The insertion obtained by matching `rule` with zero tokens.
    fn rule_insertion(
        &self,
        lhs: Symbol,
        rule: &NonterminalRule,
        best: &[Option<Insertion>],
    ) -> Option<Insertion> {
        if rule.no_insert {
            return None;
        }
        let seed = rule.insertion_cost.map(|cost| Insertion {
            cost: cost + rule.cost,
            text: rule.text.clone().unwrap_or_else(|| {
                self.term_set(lhs)
                    .map(|term_set| term_set.text.clone())
                    .unwrap_or_default()
            }),
            semantics: rule.semantic.iter().cloned().collect(),
        });

        let mut parts = Vec::with_capacity(2);
        for (i, child) in rule.rhs.iter().enumerate() {
            let insertion = match self.child_insertion(rule, i, best) {
                Some(insertion) => insertion,
                None => return seed,
            };
            parts.push((insertion, child.no_text));
        }
        // The elided child of an insertion rule is already paid for.
        if let Some(inserted) = &rule.inserted {
            let index = inserted.index.min(parts.len());
            parts.insert(index, (Insertion { cost: 0.0, ..inserted.insertion.clone() }, false));
        }

        let mut cost = rule.cost;
        let mut text = vec![];
        let mut child_semantics = vec![];
        for (insertion, no_text) in parts {
            cost += insertion.cost;
            if !no_text {
                text.extend(insertion.text);
            }
            child_semantics.extend(insertion.semantics);
        }
        if let Some(substitution) = &rule.text {
            text = substitution.clone();
        }
        let semantics = match self.reduce_semantics(rule.semantic.as_ref(), child_semantics) {
            Some(semantics) => semantics,
            None => return seed,
        };
        let candidate = Insertion {
            cost,
            text,
            semantics,
        };
        match seed {
            Some(seed) if compare_insertions(&seed, &candidate) != Ordering::Greater => Some(seed),
            _ => Some(candidate),
        }
    }

    /// The insertion available for the child at `index`, if it may be elided.
    fn child_insertion(
        &self,
        rule: &NonterminalRule,
        index: usize,
        best: &[Option<Insertion>],
    ) -> Option<Insertion> {
        let child = &rule.rhs[index];
        if !rule.allows_insertion_at(index) {
            None
        } else if child.is_optional {
            Some(Insertion::default())
        } else {
            best[child.symbol.usize()].clone()
        }
    }

    /// Applies an unreduced rule semantic to the semantics of inserted
    /// children. `None` if that breaks the function's arity.
    fn reduce_semantics(
        &self,
        semantic: Option<&SemanticNode>,
        children: Vec<SemanticNode>,
    ) -> Option<Vec<SemanticNode>> {
        match semantic {
            Some(function) if !function.is_reduced() && !children.is_empty() => {
                match self.semantics.compose(function, children) {
                    Ok(node) => Some(vec![node]),
                    Err(err) => {
                        trace!("not insertable: {}", err);
                        None
                    }
                }
            }
            Some(node) => {
                let mut semantics = vec![node.clone()];
                semantics.extend(children);
                Some(semantics)
            }
            None => Some(children),
        }
    }

    /// Derives one insertion rule per authored binary rule with an insertable
    /// child. Returns the number of added and replaced rules.
    fn add_insertion_rules(&mut self, best: &[Option<Insertion>]) -> (usize, usize) {
        let mut candidates = vec![];
        for (index, data) in self.symbols_data().iter().enumerate() {
            for rule in &data.rules {
                let rule = match rule {
                    Rule::Nonterminal(rule)
                        if rule.is_binary() && rule.origin.is_authored() && !rule.no_insert =>
                    {
                        rule
                    }
                    _ => continue,
                };
                // When both children qualify, keep only the cheaper side; a
                // tie elides the second child. Dropping both is never derived.
                let mut cheapest: Option<(usize, Insertion)> = None;
                for i in 0..2 {
                    if let Some(insertion) = self.child_insertion(rule, i, best) {
                        match &cheapest {
                            Some((_, current)) if insertion.cost.total_cmp(&current.cost) == Ordering::Greater => {}
                            _ => cheapest = Some((i, insertion)),
                        }
                    }
                }
                if let Some((elided, insertion)) = cheapest {
                    candidates.push((index, insertion_rule(rule, elided, insertion)));
                }
            }
        }

        // Rules competing for one RHS are offered best first.
        candidates.sort_by(|(index_a, a), (index_b, b)| {
            index_a
                .cmp(index_b)
                .then_with(|| a.rhs_symbols().cmp(b.rhs_symbols()))
                .then_with(|| compare_insertion_rules(self, a, b))
        });
        let (mut added, mut replaced) = (0, 0);
        for (index, rule) in candidates {
            match self.offer_derived_rule(index, rule) {
                Offer::Added => added += 1,
                Offer::Replaced => replaced += 1,
                Offer::Kept => {}
            }
        }
        (added, replaced)
    }

    /// Adds a derived rule unless its RHS exists. An existing insertion rule
    /// is replaced when the new one is strictly better.
    fn offer_derived_rule(&mut self, index: usize, rule: NonterminalRule) -> Offer {
        let key = RhsKey::Nonterminal(rule.rhs_symbols().collect());
        let position = self.symbols_data()[index]
            .rules
            .iter()
            .position(|existing| existing.rhs_key() == key);
        let outcome = match position {
            None => Offer::Added,
            Some(position) => match &self.symbols_data()[index].rules[position] {
                Rule::Nonterminal(existing)
                    if existing.origin == RuleOrigin::Insertion
                        && compare_insertion_rules(self, &rule, existing) == Ordering::Less =>
                {
                    Offer::Replaced
                }
                _ => Offer::Kept,
            },
        };
        if !matches!(outcome, Offer::Kept) {
            let lhs = Symbol::from(index);
            trace!(
                "insertion rule {} -> {} at cost {}",
                self.name_of(lhs),
                self.rhs_to_string(&Rule::Nonterminal(rule.clone())),
                rule.cost
            );
        }
        let rules = &mut self.symbols_data_mut()[index].rules;
        match (outcome, position) {
            (Offer::Replaced, Some(position)) => {
                rules[position] = rule.into();
                Offer::Replaced
            }
            (Offer::Added, _) => {
                rules.push(rule.into());
                Offer::Added
            }
            _ => Offer::Kept,
        }
    }

    /// Derives `[B, A]` for every authored binary rule `[A, B]` with a
    /// transposition cost.
    fn add_transposition_rules(&mut self) -> usize {
        let mut candidates = vec![];
        for (index, data) in self.symbols_data().iter().enumerate() {
            for rule in &data.rules {
                match rule {
                    Rule::Nonterminal(rule) if rule.is_binary() && rule.origin.is_authored() => {
                        if let Some(transposition_cost) = rule.transposition_cost {
                            candidates.push((index, transposition_rule(rule, transposition_cost)));
                        }
                    }
                    _ => {}
                }
            }
        }

        let mut added = 0;
        for (index, rule) in candidates {
            let key = RhsKey::Nonterminal(rule.rhs_symbols().collect());
            let lhs = Symbol::from(index);
            if self.rules_of(lhs).iter().any(|existing| existing.rhs_key() == key) {
                trace!("transposition of {} already present", self.name_of(lhs));
                continue;
            }
            trace!(
                "transposition rule {} -> {} at cost {}",
                self.name_of(lhs),
                self.rhs_to_string(&Rule::Nonterminal(rule.clone())),
                rule.cost
            );
            self.symbols_data_mut()[index].rules.push(rule.into());
            added += 1;
        }
        added
    }

    /// Drops `<empty>` children from authored rules. A rule left without
    /// children makes its LHS match zero tokens, and a symbol left without
    /// rules is dropped from its parents in turn.
    fn collapse_empty_rules(&mut self) -> Result<usize> {
        let mut collapsed = 0;
        loop {
            let vanishing: Vec<Option<Insertion>> = self
                .symbols()
                .map(|sym| {
                    if sym == self.empty_symbol() {
                        Some(Insertion::default())
                    } else if self.matches_only_empty(sym) {
                        self.symbols_data()[sym.usize()].zero_token.clone()
                    } else {
                        None
                    }
                })
                .collect();
            let round = self.collapse_round(&vanishing)?;
            if round == 0 {
                return Ok(collapsed);
            }
            collapsed += round;
        }
    }

    /// Rewrites every rule with a child in `vanishing`. Returns the number
    /// of rewritten or removed rules.
    fn collapse_round(&mut self, vanishing: &[Option<Insertion>]) -> Result<usize> {
        let empty = self.empty_symbol();
        let vanishes = |sym: Symbol| vanishing[sym.usize()].is_some();
        let mut collapsed = 0;
        for index in 0..self.num_syms() {
            let data = &self.symbols_data()[index];
            if !data
                .rules
                .iter()
                .filter_map(Rule::as_nonterminal)
                .any(|rule| rule.rhs_symbols().any(vanishes))
            {
                continue;
            }
            let mut zero_token = data.zero_token.clone();
            let mut collapsed_children = data.collapsed_children.clone();
            let mut kept: Vec<Rule> = Vec::with_capacity(data.rules.len());
            let mut rewritten = vec![];
            for rule in &data.rules {
                match rule {
                    Rule::Nonterminal(rule) if rule.rhs_symbols().any(vanishes) => {
                        collapsed_children.extend(
                            rule.rhs_symbols().filter(|&sym| vanishes(sym) && sym != empty),
                        );
                        match self.collapse_rule(rule, vanishing) {
                            Collapsed::Rule(rule) => rewritten.push(rule),
                            Collapsed::ZeroToken(insertion) => {
                                offer_insertion(&mut zero_token, insertion);
                                collapsed += 1;
                            }
                        }
                    }
                    _ => kept.push(rule.clone()),
                }
            }
            for rule in rewritten {
                let rule = Rule::Nonterminal(rule);
                self.validate_rule(&data.name, &rule, &kept)?;
                kept.push(rule);
                collapsed += 1;
            }
            collapsed_children.sort_unstable();
            collapsed_children.dedup();
            trace!("collapsed empty-string rules of {}", data.name);
            let data = &mut self.symbols_data_mut()[index];
            data.rules = kept;
            data.zero_token = zero_token;
            data.collapsed_children = collapsed_children;
        }
        Ok(collapsed)
    }

    /// `rule` without its children in `vanishing`. A dropped child other
    /// than `<empty>` is recorded as inserted, so its text and semantics
    /// survive.
    fn collapse_rule(&self, rule: &NonterminalRule, vanishing: &[Option<Insertion>]) -> Collapsed {
        let empty = self.empty_symbol();
        let mut positions = vec![];
        let mut parts = vec![];
        let mut cost = rule.cost;
        for (i, child) in rule.rhs.iter().enumerate() {
            match &vanishing[child.symbol.usize()] {
                Some(insertion) => {
                    cost += insertion.cost;
                    let mut insertion = insertion.clone();
                    if child.no_text {
                        insertion.text.clear();
                    }
                    parts.push((i, child.symbol, insertion));
                }
                None => positions.push(i),
            }
        }

        if positions.is_empty() {
            let mut children: Vec<Insertion> = parts.into_iter().map(|(_, _, insertion)| insertion).collect();
            // Already paid for in the rule's cost.
            if let Some(inserted) = &rule.inserted {
                let index = inserted.index.min(children.len());
                children.insert(index, Insertion { cost: 0.0, ..inserted.insertion.clone() });
            }
            let text = match &rule.text {
                Some(text) => text.clone(),
                None => children.iter().flat_map(|child| child.text.iter().cloned()).collect(),
            };
            let child_semantics: Vec<SemanticNode> =
                children.into_iter().flat_map(|child| child.semantics).collect();
            let semantics = self
                .reduce_semantics(rule.semantic.as_ref(), child_semantics.clone())
                .unwrap_or_else(|| rule.semantic.iter().cloned().chain(child_semantics).collect());
            return Collapsed::ZeroToken(Insertion {
                cost,
                text,
                semantics,
            });
        }

        let inserted = parts
            .into_iter()
            .find(|(_, symbol, _)| *symbol != empty)
            .map(|(index, symbol, insertion)| InsertedChild {
                index,
                symbol,
                insertion,
            });
        Collapsed::Rule(NonterminalRule {
            rhs: positions.iter().map(|&i| rule.rhs[i]).collect(),
            cost,
            transposition_cost: None,
            no_insertion_indexes: remap_indexes(&rule.no_insertion_indexes, |i| {
                positions.iter().position(|&p| p == i)
            }),
            origin: RuleOrigin::Collapsed,
            inserted: inserted.or_else(|| rule.inserted.clone()),
            ..rule.clone()
        })
    }
}

/// A unary rule with the child at `elided` removed from `rule`.
fn insertion_rule(rule: &NonterminalRule, elided: usize, insertion: Insertion) -> NonterminalRule {
    let kept = 1 - elided;
    NonterminalRule {
        rhs: vec![Child {
            is_optional: false,
            ..rule.rhs[kept]
        }],
        cost: rule.cost + insertion.cost,
        transposition_cost: None,
        insertion_cost: None,
        no_insertion_indexes: remap_indexes(&rule.no_insertion_indexes, |i| (i == kept).then_some(0)),
        origin: RuleOrigin::Insertion,
        inserted: Some(InsertedChild {
            index: elided,
            symbol: rule.rhs[elided].symbol,
            insertion,
        }),
        ..rule.clone()
    }
}

fn transposition_rule(rule: &NonterminalRule, transposition_cost: f64) -> NonterminalRule {
    NonterminalRule {
        rhs: vec![rule.rhs[1], rule.rhs[0]],
        cost: rule.cost + transposition_cost,
        transposition_cost: None,
        insertion_cost: None,
        no_insertion_indexes: remap_indexes(&rule.no_insertion_indexes, |i| Some(1 - i)),
        origin: RuleOrigin::Transposition,
        inserted: None,
        ..rule.clone()
    }
}

fn remap_indexes(indexes: &[usize], map: impl Fn(usize) -> Option<usize>) -> Vec<usize> {
    let mut result: Vec<usize> = indexes.iter().filter_map(|&i| map(i)).collect();
    result.sort_unstable();
    result.dedup();
    result
}

/// Total order on insertions: cost, then text length, text, and semantics.
fn compare_insertions(a: &Insertion, b: &Insertion) -> Ordering {
    a.cost
        .total_cmp(&b.cost)
        .then_with(|| a.text.len().cmp(&b.text.len()))
        .then_with(|| a.text.cmp(&b.text))
        .then_with(|| a.semantics.cmp(&b.semantics))
}

/// Total order on derived rules with one LHS and RHS: cost, the insertion,
/// then everything else the rule carries. The elided child comes last and
/// tells apart rules derived from different sources.
fn compare_insertion_rules(grammar: &Grammar, a: &NonterminalRule, b: &NonterminalRule) -> Ordering {
    let annotations = |rule: &NonterminalRule| {
        (
            rule.grammatical_form,
            rule.person_number,
            rule.grammatical_case,
            rule.accepted_tense,
        )
    };
    let flags = |rule: &NonterminalRule| {
        rule.rhs
            .iter()
            .map(|child| (child.is_optional, child.no_insert, child.no_text))
            .collect::<Vec<_>>()
    };
    let elided = |rule: &NonterminalRule| {
        rule.inserted
            .as_ref()
            .map(|inserted| (inserted.index, grammar.name_of(inserted.symbol)))
    };
    a.cost
        .total_cmp(&b.cost)
        .then_with(|| match (&a.inserted, &b.inserted) {
            (Some(inserted_a), Some(inserted_b)) => {
                compare_insertions(&inserted_a.insertion, &inserted_b.insertion)
            }
            _ => Ordering::Equal,
        })
        .then_with(|| a.semantic.cmp(&b.semantic))
        .then_with(|| a.text.cmp(&b.text))
        .then_with(|| annotations(a).cmp(&annotations(b)))
        .then_with(|| flags(a).cmp(&flags(b)))
        .then_with(|| a.no_insertion_indexes.cmp(&b.no_insertion_indexes))
        .then_with(|| elided(a).cmp(&elided(b)))
}

/// Keeps the better of the current and the candidate insertion. Returns
/// whether the candidate won.
fn offer_insertion(slot: &mut Option<Insertion>, candidate: Insertion) -> bool {
    match slot {
        Some(current) if compare_insertions(&candidate, current) != Ordering::Less => false,
        _ => {
            *slot = Some(candidate);
            true
        }
    }
}
