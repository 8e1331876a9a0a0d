//! Static puzzle catalog.
//!
//! The catalog is compiled in: ten ophthalmic product puzzles, each an
//! uppercase display word (single spaces allowed as word separators), a
//! clinical description shown as the clue, and a reference citation shown
//! on demand. Selection and shuffling happen per round in the engine.

/// One word-guessing challenge. Immutable catalog data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PuzzleEntry {
    /// Display word, uppercase; may contain single spaces which are never
    /// selectable and are skipped during validation and slot filling.
    pub word: &'static str,
    /// Clue text shown while the puzzle is active.
    pub description: &'static str,
    /// Citation text shown in the reference modal.
    pub reference: &'static str,
}

impl PuzzleEntry {
    /// The answer the player must reconstruct: the display word with
    /// spaces removed. Comparison is case-sensitive.
    pub fn answer(&self) -> String {
        self.word.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// Number of letters the player must enter (spaces excluded).
    pub fn letter_count(&self) -> usize {
        self.word.chars().filter(|c| !c.is_whitespace()).count()
    }

    /// Unique letters of the word in first-occurrence order, spaces
    /// stripped. One selectable token is generated per unique letter.
    pub fn unique_letters(&self) -> Vec<char> {
        let mut letters = Vec::new();
        for c in self.word.chars().filter(|c| !c.is_whitespace()) {
            if !letters.contains(&c) {
                letters.push(c);
            }
        }
        letters
    }
}

pub const CATALOG: &[PuzzleEntry] = &[
    PuzzleEntry {
        word: "OPTIVE FUSION",
        description: "Artificial tears that contains the synergy CMC, HA and Osmoprotectants for mild to moderate type of Dry Eyes.",
        reference: "Optive Fusion MD Product Insert CCDS version 5.0 Date of Revision: October 2017.",
    },
    PuzzleEntry {
        word: "PURITE",
        description: "A disappearing preservative. It converts into natural tear components (sodium chloride, oxygen, water) when exposed to light.",
        reference: "Freeman PD, Kahook MY. Expert Rev Ophthalmol 2009;4(1):59-64; Jones L, et al. The Ocular Surface 15 (2017) 575-628; Noecker R. Adv Ther. 2001.",
    },
    PuzzleEntry {
        word: "OZURDEX",
        description: "A Dexamethasone Implant with 700 mcg sustained-release sterile rod for ophthalmic intravitreal injection.",
        reference: "Ozurdex Product Insert CCDS 9.0 Date of Revision: June 2020.",
    },
    PuzzleEntry {
        word: "ALPHAGAN P",
        description: "Brimonidine Tartrate 1.5 mg/mL ophthalmic solution preserved with Purite. Lowers intraocular pressure in patients with open-angle glaucoma or ocular hypertension.",
        reference: "Alphagan P 0.15% Product Insert CCDS 2.1 Date of Revision: April 2019.",
    },
    PuzzleEntry {
        word: "COMBIGAN",
        description: "Combination of Brimonidine Tartrate + Timolol Maleate. Indicated to reduce IOP in chronic open-angle glaucoma or ocular hypertension patients insufficiently responsive to beta-blockers.",
        reference: "Combigan Product Insert CCDS v3, Date of First Authorization March 2008.",
    },
    PuzzleEntry {
        word: "OPTIVE ADVANCED",
        description: "Eye drop containing castor oil & Polysorbate 80, acting as emulsifiers to stabilize the lipid layer upon instillation.",
        reference: "Benelli U. Clin Ophthalmol 2011;5:783-90; Korb DR et al.; Scaffidi RC et al.; Simmons PA et al. Clin Ther 2015; Kathuria A et al. J Clin Med 2021.",
    },
    PuzzleEntry {
        word: "RESTASIS",
        description: "Indicated to increase tear production in patients whose tear production is suppressed due to ocular inflammation from keratoconjunctivitis sicca.",
        reference: "Restasis Product Insert CCDS v4.0, January 2022; TFOS DEWS II Pathophysiology Report (2017).",
    },
    PuzzleEntry {
        word: "LUMIGAN",
        description: "A prostamide (Bimatoprost) that lowers IOP by increasing aqueous humor outflow through uveoscleral and trabecular pathways.",
        reference: "Pfennigsdorf S et al. Clin Ophthalmol 2012; BMC Ophthalmology 2016; Bimatoprost PI CCDS v13, June 2021; NLM PubChem Data.",
    },
    PuzzleEntry {
        word: "GANFORT",
        description: "Contains 0.3 mg bimatoprost + 5 mg timolol maleate. Reduces IOP in open-angle glaucoma or ocular hypertension insufficiently responsive to monotherapy.",
        reference: "Philippines API based on Ganfort Full PI dated June 2021.",
    },
    PuzzleEntry {
        word: "OPTIVE GEL",
        description: "A gel-drop formula for instant relief with CMC 1% and Osmoprotectants, giving long-lasting comfort day and night.",
        reference: "Optive Gel Drops Product Insert (Philippines, 2021).",
    },
];
