//! Console tabulation of scoring output.

use stanza::style::{HAlign, Header, MinWidth, Styles};
use stanza::table::{Cell, Col, Row, Table};

use crate::autopsy::BetAutopsy;
use crate::convergence::ConvergenceResult;
use crate::narrative::NarrativeFlag;
use crate::slate::TopPick;

pub fn tabulate_factors(result: &ConvergenceResult) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(24))),
            Col::new(Styles::default().with(MinWidth(9)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(9)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Factor".into(), "Signal".into(), "Strength".into()],
        ));
    table.push_rows(result.factors.iter().map(|factor| {
        Row::new(
            Styles::default(),
            vec![
                factor.name.clone().into(),
                format!("{}", factor.signal).into(),
                format!("{:.2}", factor.strength).into(),
            ],
        )
    }));
    table
}

pub fn tabulate_flags(flags: &[NarrativeFlag]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(20))),
            Col::new(Styles::default().with(MinWidth(9)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(9)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(40))),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "Flag".into(),
                "Impact".into(),
                "Severity".into(),
                "Headline".into(),
            ],
        ));
    table.push_rows(flags.iter().map(|flag| {
        Row::new(
            Styles::default(),
            vec![
                format!("{}", flag.kind).into(),
                format!("{:?}", flag.impact).into(),
                format!("{:?}", flag.severity).into(),
                flag.headline.clone().into(),
            ],
        )
    }));
    table
}

pub fn tabulate_picks(picks: &[TopPick]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(22))),
            Col::new(Styles::default().with(MinWidth(14))),
            Col::new(Styles::default().with(MinWidth(7)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(9)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(11)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec![
                "Rank".into(),
                "Player".into(),
                "Stat".into(),
                "Line".into(),
                "Call".into(),
                "Score".into(),
                "Confidence".into(),
            ],
        ));
    table.push_rows(picks.iter().enumerate().map(|(index, pick)| {
        Row::new(
            Styles::default(),
            vec![
                Cell::new(
                    Styles::default().with(HAlign::Right),
                    format!("{}", index + 1).into(),
                ),
                pick.query.player.name.clone().into(),
                format!("{}", pick.query.stat).into(),
                format!("{:.1}", pick.query.line).into(),
                format!("{}", pick.result.direction).into(),
                format!("{}", pick.result.score).into(),
                format!("{:.0}%", pick.result.confidence * 100.0).into(),
            ],
        )
    }));
    table
}

pub fn tabulate_autopsy(autopsy: &BetAutopsy) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(18))),
            Col::new(Styles::default().with(MinWidth(50))),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Field".into(), "Value".into()],
        ))
        .with_row(Row::new(
            Styles::default(),
            vec![
                "Process grade".into(),
                format!("{}", autopsy.process_grade).into(),
            ],
        ))
        .with_row(Row::new(
            Styles::default(),
            vec![
                "Unluck score".into(),
                format!("{}/100", autopsy.unluck_score).into(),
            ],
        ))
        .with_row(Row::new(
            Styles::default(),
            vec![
                "Would bet again".into(),
                format!("{}", autopsy.would_bet_again).into(),
            ],
        ))
        .with_row(Row::new(
            Styles::default(),
            vec![
                "Assessment".into(),
                autopsy.process_assessment.clone().into(),
            ],
        ));
    for cause in &autopsy.root_causes {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("Cause ({:?})", cause.severity).into(),
                format!("{}: {}", cause.label, cause.detail).into(),
            ],
        ));
    }
    for lesson in &autopsy.lessons_learned {
        table.push_row(Row::new(
            Styles::default(),
            vec!["Lesson".into(), lesson.clone().into()],
        ));
    }
    table
}
