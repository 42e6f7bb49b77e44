use log::debug;

use crate::tmx_parser::TmxEvent;

/// One extracted alignment, ready for output.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

/// The text of one translation-unit variant while its unit is in flight.
struct Variant {
    lang: String,
    text: String,
}

/// Rebuilds language-pair alignments from the [TmxEvent] stream.
///
/// All pairing state is local to the assembler, so several sessions can run
/// without sharing anything. Units that lack one of the two requested
/// languages are an expected condition in OPUS corpora; they are counted and
/// dropped, never paired with a neighbouring unit.
pub struct PairAssembler {
    source_lang: String,
    target_lang: String,
    unit_id: Option<String>,
    source_slot: Option<String>,
    target_slot: Option<String>,
    variant: Option<Variant>,
    in_unit: bool,
    pairs_emitted: u64,
    units_discarded: u64,
}

impl PairAssembler {
    pub fn new(source_lang: &str, target_lang: &str) -> PairAssembler {
        PairAssembler {
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            unit_id: None,
            source_slot: None,
            target_slot: None,
            variant: None,
            in_unit: false,
            pairs_emitted: 0,
            units_discarded: 0,
        }
    }

    /// Feed one event; returns a completed pair when a unit closes with both
    /// requested languages present.
    pub fn observe(&mut self, event: TmxEvent) -> Option<LanguagePair> {
        match event {
            TmxEvent::UnitStart(id) => {
                self.unit_id = id;
                self.source_slot = None;
                self.target_slot = None;
                self.variant = None;
                self.in_unit = true;
                None
            }
            TmxEvent::VariantStart(lang) => {
                if self.in_unit {
                    self.variant = Some(Variant {
                        lang,
                        text: String::new(),
                    });
                }
                None
            }
            TmxEvent::Text(content) => {
                if let Some(variant) = &mut self.variant {
                    variant.text.push_str(&content);
                }
                None
            }
            TmxEvent::VariantEnd => {
                if let Some(variant) = self.variant.take() {
                    // A repeated language within one unit overwrites the
                    // earlier text. Languages outside the requested pair are
                    // ignored, OPUS units may carry more than two variants.
                    if variant.lang.eq_ignore_ascii_case(&self.source_lang) {
                        self.source_slot = Some(variant.text);
                    } else if variant.lang.eq_ignore_ascii_case(&self.target_lang) {
                        self.target_slot = Some(variant.text);
                    }
                }
                None
            }
            TmxEvent::UnitEnd => {
                self.in_unit = false;
                match (self.source_slot.take(), self.target_slot.take()) {
                    (Some(source), Some(target)) => {
                        self.pairs_emitted += 1;
                        Some(LanguagePair { source, target })
                    }
                    _ => {
                        self.units_discarded += 1;
                        debug!(
                            "ignoring unit {:?} with missing language {} or {}",
                            self.unit_id, self.source_lang, self.target_lang
                        );
                        None
                    }
                }
            }
            TmxEvent::DocumentEnd => None,
        }
    }

    /// Pairs emitted so far in this session.
    pub fn pairs_emitted(&self) -> u64 {
        self.pairs_emitted
    }

    /// Units dropped because one of the requested languages was missing.
    pub fn units_discarded(&self) -> u64 {
        self.units_discarded
    }
}
