//! Post-hoc analysis of settled bets (the "graveyard"): grades the decision
//! process, classifies root causes and splits the miss between bad luck and
//! bad process. An autopsy is computed once from the snapshot taken at bet
//! time plus the realized outcome; re-running the analysis creates a new
//! value, it never mutates an old one.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::convergence::NUM_FACTORS;
use crate::domain::StatKind;

/// Margin within which a miss counts as narrow, and the moderate band above it.
pub const NARROW_MISS: f64 = 1.0;
pub const MODERATE_MISS: f64 = 3.0;
/// Oriented miss beyond this fraction of the line reads as a blowout script.
pub const BLOWOUT_MISS_PCT: f64 = 0.5;
/// Convergence at or above this counts as a high-conviction bet.
pub const HIGH_CONVICTION: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BetSide {
    Over,
    Under,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
pub enum ProcessGrade {
    A,
    B,
    C,
    D,
    F,
}

/// Fixed root-cause taxonomy. `Other` is a deliberate catch-all so the set
/// stays closed without pretending to full coverage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CauseLabel {
    Blowout,
    InjuryDuringGame,
    FoulTrouble,
    MinuteRestriction,
    LineupChange,
    GameFlow,
    Regression,
    LineWasSharp,
    BadMatchupRead,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CauseSeverity {
    Primary,
    Contributing,
    Minor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RootCause {
    pub label: CauseLabel,
    pub detail: String,
    pub severity: CauseSeverity,
    /// Could the bettor reasonably have anticipated this before tip-off.
    pub was_knowable: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BetAutopsy {
    pub process_grade: ProcessGrade,
    pub root_causes: Vec<RootCause>,
    pub unluck_score: u32,
    pub would_bet_again: bool,
    pub process_assessment: String,
    pub lessons_learned: Vec<String>,
}

/// A settled, losing bet as recorded in the graveyard: the snapshot taken at
/// bet time plus the realized outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraveyardEntry {
    pub player_name: String,
    pub stat: StatKind,
    pub line: f64,
    pub side: BetSide,
    pub actual_value: f64,
    /// Convergence score recorded when the bet was placed.
    pub convergence: usize,
}
impl GraveyardEntry {
    pub fn autopsy(&self) -> BetAutopsy {
        generate_autopsy(
            &self.player_name,
            self.stat,
            self.line,
            self.side,
            self.actual_value,
            self.convergence,
        )
    }
}

/// Dissects one settled bet. `convergence` is the score recorded at bet time,
/// in `0..=7`.
pub fn generate_autopsy(
    player_name: &str,
    stat: StatKind,
    line: f64,
    side: BetSide,
    actual_value: f64,
    convergence: usize,
) -> BetAutopsy {
    // oriented margin: positive means the bet cashed
    let margin = match side {
        BetSide::Over => actual_value - line,
        BetSide::Under => line - actual_value,
    };
    let process_grade = grade(convergence, margin);
    let root_causes = classify_causes(player_name, stat, line, side, actual_value, convergence, margin);
    let would_bet_again = process_grade <= ProcessGrade::B;
    BetAutopsy {
        process_grade,
        unluck_score: unluck_score(convergence, line, margin),
        would_bet_again,
        process_assessment: assessment(process_grade, convergence, margin),
        lessons_learned: lessons(&root_causes, process_grade),
        root_causes,
    }
}

/// The grade decision table, keyed by conviction and miss magnitude. A win
/// grades purely on conviction; the graveyard only ever feeds losses.
fn grade(convergence: usize, margin: f64) -> ProcessGrade {
    if margin > 0.0 {
        return if convergence >= HIGH_CONVICTION {
            ProcessGrade::A
        } else if convergence == HIGH_CONVICTION - 1 {
            ProcessGrade::B
        } else {
            ProcessGrade::C
        };
    }
    let miss = -margin;
    let narrow = miss <= NARROW_MISS;
    let moderate = miss <= MODERATE_MISS;
    match convergence {
        c if c >= HIGH_CONVICTION => {
            if narrow {
                ProcessGrade::A
            } else if moderate {
                ProcessGrade::B
            } else {
                ProcessGrade::C
            }
        }
        4 => {
            if narrow {
                ProcessGrade::B
            } else if moderate {
                ProcessGrade::C
            } else {
                ProcessGrade::D
            }
        }
        3 => {
            if narrow {
                ProcessGrade::C
            } else if moderate {
                ProcessGrade::D
            } else {
                ProcessGrade::F
            }
        }
        _ => {
            if narrow {
                ProcessGrade::D
            } else {
                ProcessGrade::F
            }
        }
    }
}

fn classify_causes(
    player_name: &str,
    stat: StatKind,
    line: f64,
    side: BetSide,
    actual_value: f64,
    convergence: usize,
    margin: f64,
) -> Vec<RootCause> {
    if margin > 0.0 {
        return vec![];
    }
    let miss = -margin;
    let mut causes = vec![];

    if actual_value == 0.0 && side == BetSide::Over {
        causes.push(RootCause {
            label: CauseLabel::InjuryDuringGame,
            detail: format!("{player_name} recorded zero {stat}; an in-game exit is the usual culprit"),
            severity: CauseSeverity::Primary,
            was_knowable: false,
        });
        causes.push(RootCause {
            label: CauseLabel::MinuteRestriction,
            detail: "a pre-planned minutes cap produces the same zero-line".into(),
            severity: CauseSeverity::Contributing,
            was_knowable: true,
        });
    } else if miss > BLOWOUT_MISS_PCT * line.abs() {
        causes.push(RootCause {
            label: CauseLabel::Blowout,
            detail: format!(
                "missed a {line:.1} line by {miss:.1}; a lopsided script wipes out second halves"
            ),
            severity: CauseSeverity::Primary,
            was_knowable: false,
        });
        causes.push(RootCause {
            label: CauseLabel::GameFlow,
            detail: "pace and rotation never settled into the expected pattern".into(),
            severity: CauseSeverity::Contributing,
            was_knowable: false,
        });
    } else if miss <= NARROW_MISS {
        causes.push(RootCause {
            label: CauseLabel::LineWasSharp,
            detail: format!("the book had {stat} priced within {NARROW_MISS:.0} of the outcome"),
            severity: CauseSeverity::Primary,
            was_knowable: false,
        });
        if convergence <= 3 {
            causes.push(RootCause {
                label: CauseLabel::Regression,
                detail: "low conviction on a coin-flip number is regression bait".into(),
                severity: CauseSeverity::Contributing,
                was_knowable: true,
            });
        }
    } else if convergence >= 4 {
        causes.push(RootCause {
            label: CauseLabel::GameFlow,
            detail: "solid read undone by how the game actually unfolded".into(),
            severity: CauseSeverity::Primary,
            was_knowable: false,
        });
        causes.push(RootCause {
            label: CauseLabel::Regression,
            detail: "the averages behind the factors carry game-to-game variance".into(),
            severity: CauseSeverity::Minor,
            was_knowable: true,
        });
    } else {
        causes.push(RootCause {
            label: CauseLabel::BadMatchupRead,
            detail: format!("{convergence}/{NUM_FACTORS} factors agreed; the edge was never there"),
            severity: CauseSeverity::Primary,
            was_knowable: true,
        });
        causes.push(RootCause {
            label: CauseLabel::GameFlow,
            detail: "an unfavourable script compounded a thin edge".into(),
            severity: CauseSeverity::Contributing,
            was_knowable: false,
        });
    }
    causes
}

/// 0 is pure bad process, 100 pure bad luck: conviction and narrowness each
/// contribute half.
fn unluck_score(convergence: usize, line: f64, margin: f64) -> u32 {
    if margin > 0.0 {
        return 0;
    }
    let miss = -margin;
    let conviction = convergence.min(NUM_FACTORS) as f64 / NUM_FACTORS as f64;
    let miss_span = f64::max(EDGE_MISS_SPAN_PCT * line.abs(), NARROW_MISS);
    let narrowness = 1.0 - (miss / miss_span).min(1.0);
    (50.0 * conviction + 50.0 * narrowness).round() as u32
}

/// Fraction of the line over which narrowness decays to zero.
const EDGE_MISS_SPAN_PCT: f64 = 0.25;

fn assessment(grade: ProcessGrade, convergence: usize, margin: f64) -> String {
    match grade {
        ProcessGrade::A => format!(
            "{convergence}/{NUM_FACTORS} factors converged and the result landed within a whisker; \
             this is exactly the bet to keep making"
        ),
        ProcessGrade::B => "sound process, unlucky outcome; the edge was real even if the night wasn't".into(),
        ProcessGrade::C => format!(
            "defensible but thin: {convergence}/{NUM_FACTORS} convergence left little room for variance"
        ),
        ProcessGrade::D => "the process was shaky; conviction did not justify the exposure".into(),
        ProcessGrade::F => format!(
            "low-conviction bet lost badly (missed by {:.1}); this one was avoidable",
            -margin
        ),
    }
}

fn lessons(causes: &[RootCause], grade: ProcessGrade) -> Vec<String> {
    let mut lessons = vec![];
    for cause in causes {
        if cause.was_knowable {
            lessons.push(match cause.label {
                CauseLabel::MinuteRestriction => {
                    "check pre-game minutes reporting before betting volume stats".into()
                }
                CauseLabel::Regression => {
                    "treat narrow lines on low conviction as coin flips and pass".into()
                }
                CauseLabel::BadMatchupRead => {
                    "require more factor agreement before calling a matchup an edge".into()
                }
                label => format!("{label} was knowable pre-game; weigh it next time"),
            });
        }
    }
    if grade <= ProcessGrade::B {
        lessons.push("a good decision with a bad result is still a good decision".into());
    }
    lessons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn autopsy(side: BetSide, line: f64, actual: f64, convergence: usize) -> BetAutopsy {
        generate_autopsy("Jayson Tatum", StatKind::Points, line, side, actual, convergence)
    }

    #[test]
    fn high_conviction_narrow_miss_grades_a() {
        // convergence 6, over 25.5, landed 24.9: miss of 0.6
        let autopsy = autopsy(BetSide::Over, 25.5, 24.9, 6);
        assert!(matches!(autopsy.process_grade, ProcessGrade::A | ProcessGrade::B));
        assert!(autopsy.would_bet_again);
        assert_eq!(ProcessGrade::A, autopsy.process_grade);
    }

    #[test]
    fn low_conviction_bad_loss_grades_f() {
        let autopsy = autopsy(BetSide::Over, 25.5, 18.0, 2);
        assert_eq!(ProcessGrade::F, autopsy.process_grade);
        assert!(!autopsy.would_bet_again);
    }

    #[test]
    fn would_bet_again_tracks_grade_not_outcome() {
        for convergence in 0..=NUM_FACTORS {
            for (line, actual) in [(25.5, 24.9), (25.5, 20.0), (25.5, 10.0)] {
                let autopsy = autopsy(BetSide::Over, line, actual, convergence);
                assert_eq!(
                    autopsy.process_grade <= ProcessGrade::B,
                    autopsy.would_bet_again
                );
            }
        }
    }

    #[test]
    fn under_bet_margin_is_oriented() {
        // under 25.5, actual 26.1: miss of 0.6 on a conviction-6 read
        let near_miss = autopsy(BetSide::Under, 25.5, 26.1, 6);
        assert_eq!(ProcessGrade::A, near_miss.process_grade);

        // under 25.5, actual 24.0: the bet won
        let autopsy = autopsy(BetSide::Under, 25.5, 24.0, 6);
        assert_eq!(ProcessGrade::A, autopsy.process_grade);
        assert!(autopsy.root_causes.is_empty());
        assert_eq!(0, autopsy.unluck_score);
    }

    #[test]
    fn blowout_classification() {
        // miss of 15 on a 25.5 line exceeds half the line
        let autopsy = autopsy(BetSide::Over, 25.5, 10.5, 5);
        let primary = &autopsy.root_causes[0];
        assert_eq!(CauseLabel::Blowout, primary.label);
        assert_eq!(CauseSeverity::Primary, primary.severity);
        assert!(!primary.was_knowable);
    }

    #[test]
    fn zero_line_classifies_in_game_exit() {
        let autopsy = autopsy(BetSide::Over, 25.5, 0.0, 5);
        assert_eq!(CauseLabel::InjuryDuringGame, autopsy.root_causes[0].label);
        assert_eq!(CauseLabel::MinuteRestriction, autopsy.root_causes[1].label);
        assert!(autopsy.root_causes[1].was_knowable);
    }

    #[test]
    fn narrow_miss_blames_the_line() {
        let autopsy = autopsy(BetSide::Over, 25.5, 24.8, 6);
        assert_eq!(CauseLabel::LineWasSharp, autopsy.root_causes[0].label);
        // high conviction: no regression lecture
        assert_eq!(1, autopsy.root_causes.len());
    }

    #[test]
    fn thin_edge_moderate_miss_blames_the_read() {
        let autopsy = autopsy(BetSide::Over, 25.5, 23.0, 2);
        assert_eq!(CauseLabel::BadMatchupRead, autopsy.root_causes[0].label);
        assert!(autopsy.root_causes[0].was_knowable);
        assert!(autopsy
            .lessons_learned
            .iter()
            .any(|lesson| lesson.contains("factor agreement")));
    }

    #[test]
    fn unluck_score_biases_toward_luck_on_high_conviction_narrow_misses() {
        let unlucky = autopsy(BetSide::Over, 25.5, 25.0, 7);
        let sloppy = autopsy(BetSide::Over, 25.5, 15.0, 1);
        assert!(unlucky.unluck_score > 85);
        assert!(sloppy.unluck_score < 15);
        assert!(unlucky.unluck_score <= 100);
    }

    #[test]
    fn autopsy_is_deterministic() {
        let first = autopsy(BetSide::Over, 25.5, 22.0, 4);
        let second = autopsy(BetSide::Over, 25.5, 22.0, 4);
        assert_eq!(first, second);
    }
}
