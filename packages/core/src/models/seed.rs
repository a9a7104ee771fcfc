//! Default Dataset
//!
//! The known-good starting hierarchy and sample log history. Used to seed an
//! empty database and as the fallback whenever storage cannot be read, so the
//! UI always has a consistent tree to render.

use super::log::WorkoutLog;
use super::node::{colors, TrainingNode};
use chrono::{DateTime, TimeZone, Utc};

fn leaf(id: &str, name: &str, color: &str, value: f64) -> TrainingNode {
    TrainingNode {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        value: Some(value),
        level: 3,
        children: None,
        description: None,
    }
}

fn how(id: &str, name: &str, color: &str, children: Vec<TrainingNode>) -> TrainingNode {
    TrainingNode {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        value: None,
        level: 2,
        children: Some(children),
        description: None,
    }
}

fn why(id: &str, name: &str, color: &str, children: Vec<TrainingNode>) -> TrainingNode {
    TrainingNode {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        value: None,
        level: 1,
        children: Some(children),
        description: None,
    }
}

/// The default Why/How/What hierarchy.
pub fn default_tree() -> TrainingNode {
    TrainingNode {
        id: TrainingNode::ROOT_ID.to_string(),
        name: "Training Universe".to_string(),
        color: TrainingNode::ROOT_COLOR.to_string(),
        value: None,
        level: 0,
        children: Some(vec![
            why(
                "why-balanced",
                "BE BALANCED",
                "#e2e8f0",
                vec![
                    how(
                        "how-skill",
                        "Hand Balancing",
                        colors::PUSH_SKILL,
                        vec![
                            leaf(
                                "what-handstand",
                                "Handstand (3min Acc)",
                                colors::PUSH_SKILL,
                                540.0,
                            ),
                            leaf(
                                "what-balancing",
                                "Hand Balancing Skill",
                                colors::PUSH_SKILL,
                                3.0,
                            ),
                        ],
                    ),
                    how(
                        "how-mobility",
                        "Flexibility",
                        colors::MOBILITY,
                        vec![
                            leaf("what-pancake", "Pancake", colors::MOBILITY, 1.0),
                            leaf("what-pike-h2t", "Pike H2T", colors::MOBILITY, 1.0),
                        ],
                    ),
                ],
            ),
            why(
                "why-strong",
                "BE STRONG",
                "#cbd5e1",
                vec![
                    how(
                        "how-push",
                        "Pushing Strength",
                        colors::PUSH_STRENGTH,
                        vec![
                            leaf("what-hspu", "HSPU", colors::PUSH_STRENGTH, 10.0),
                            leaf("what-pike-pu", "Pike PU", colors::PUSH_STRENGTH, 45.0),
                            leaf(
                                "what-pushups",
                                "Pushups & Dips",
                                colors::PUSH_STRENGTH,
                                72.0,
                            ),
                        ],
                    ),
                    how(
                        "how-pull",
                        "Pulling Strength",
                        colors::PULL,
                        vec![
                            leaf("what-muscleups", "Muscle Ups", colors::PULL, 0.0),
                            leaf("what-pullups", "Pullups", colors::PULL, 192.0),
                            leaf("what-deadhang", "Dead Hang", colors::PULL, 150.0),
                        ],
                    ),
                ],
            ),
            why(
                "why-athletic",
                "BE ATHLETIC",
                "#94a3b8",
                vec![
                    how(
                        "how-legs",
                        "Leg Power",
                        colors::LEGS,
                        vec![
                            leaf(
                                "what-pistol",
                                "Leg Strength (Pistol)",
                                colors::LEGS,
                                109.0,
                            ),
                            leaf("what-squat-mob", "Squat Mobility (ATG)", colors::LEGS, 1.0),
                        ],
                    ),
                    how(
                        "how-activity",
                        "Daily Activity",
                        colors::ACTIVITY,
                        vec![
                            leaf("what-running", "Running", colors::ACTIVITY, 8.5),
                            leaf("what-sport", "Sport/Activity", colors::ACTIVITY, 2.0),
                        ],
                    ),
                ],
            ),
        ]),
        description: None,
    }
}

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    // Seed history covers one December week.
    Utc.with_ymd_and_hms(2025, 12, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn entry(
    id: &str,
    node_id: &str,
    node_name: &str,
    logged_at: DateTime<Utc>,
    value: f64,
    unit: &str,
    notes: &str,
) -> WorkoutLog {
    WorkoutLog {
        id: id.to_string(),
        node_id: node_id.to_string(),
        node_name: node_name.to_string(),
        logged_at,
        value,
        unit: unit.to_string(),
        notes: Some(notes.to_string()),
    }
}

/// Sample log history matching [`default_tree`], newest day first.
pub fn default_logs() -> Vec<WorkoutLog> {
    vec![
        entry(
            "log-23-1",
            "what-balancing",
            "Hand Balancing Skill",
            at(23, 10, 0),
            1.0,
            "sessions",
            "Hand balancing: 1 session",
        ),
        entry(
            "log-23-2",
            "what-handstand",
            "Handstand (3min Acc)",
            at(23, 10, 15),
            180.0,
            "seconds",
            "Sets: 60, 60, 40, 20",
        ),
        entry(
            "log-23-3",
            "what-pike-pu",
            "Pike PU",
            at(23, 10, 30),
            15.0,
            "reps",
            "Sets: 5, 5, 5",
        ),
        entry(
            "log-23-4",
            "what-pancake",
            "Pancake",
            at(23, 11, 0),
            1.0,
            "sessions",
            "Pancake: 1 session",
        ),
        entry(
            "log-22-1",
            "what-pullups",
            "Pullups",
            at(22, 9, 0),
            18.0,
            "reps",
            "Sets: 6, 6, 6",
        ),
        entry(
            "log-21-1",
            "what-handstand",
            "Handstand (3min Acc)",
            at(21, 8, 15),
            180.0,
            "seconds",
            "Sets: 60, 50, 30, 40",
        ),
        entry(
            "log-21-2",
            "what-pistol",
            "Leg Strength (Pistol)",
            at(21, 8, 45),
            9.0,
            "reps",
            "Sets: 3, 3, 3",
        ),
        entry(
            "log-21-3",
            "what-deadhang",
            "Dead Hang",
            at(21, 9, 30),
            65.0,
            "seconds",
            "Dead hang 65 seconds",
        ),
        entry(
            "log-20-1",
            "what-pistol",
            "Leg Strength (Pistol)",
            at(20, 17, 0),
            100.0,
            "reps",
            "100 air squats (leg power)",
        ),
        entry(
            "log-20-2",
            "what-pullups",
            "Pullups",
            at(20, 17, 30),
            64.0,
            "reps",
            "Ladder sets",
        ),
        entry(
            "log-19-1",
            "what-hspu",
            "HSPU",
            at(19, 11, 0),
            10.0,
            "reps",
            "3x max depth wall hand stand pushups",
        ),
        entry(
            "log-18-1",
            "what-running",
            "Running",
            at(18, 7, 0),
            0.75,
            "miles",
            "Morning run",
        ),
        entry(
            "log-18-2",
            "what-pullups",
            "Pullups",
            at(18, 12, 0),
            50.0,
            "reps",
            "Sets: 5 x 10",
        ),
        entry(
            "log-18-3",
            "what-sport",
            "Sport/Activity",
            at(18, 18, 0),
            1.0,
            "sessions",
            "Sport session",
        ),
        entry(
            "log-17-1",
            "what-running",
            "Running",
            at(17, 8, 0),
            4.7,
            "miles",
            "Run 1",
        ),
        entry(
            "log-17-2",
            "what-running",
            "Running",
            at(17, 17, 0),
            2.3,
            "miles",
            "Run 2",
        ),
        entry(
            "log-16-1",
            "what-deadhang",
            "Dead Hang",
            at(16, 10, 0),
            85.0,
            "seconds",
            "Dead hang: 85 seconds",
        ),
        entry(
            "log-16-2",
            "what-pushups",
            "Pushups & Dips",
            at(16, 10, 15),
            72.0,
            "seconds",
            "Sally up challenge: 72 seconds",
        ),
        entry(
            "log-15-1",
            "what-pullups",
            "Pullups",
            at(15, 9, 0),
            60.0,
            "reps",
            "Ladder sets",
        ),
        entry(
            "log-15-2",
            "what-squat-mob",
            "Squat Mobility (ATG)",
            at(15, 9, 45),
            1.0,
            "sessions",
            "Squat mobility session",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tree_is_well_formed() {
        let tree = default_tree();
        assert_eq!(tree.id, TrainingNode::ROOT_ID);
        assert_eq!(tree.level, 0);
        assert_eq!(tree.children.as_ref().unwrap().len(), 3);

        fn check_levels(node: &TrainingNode) {
            for child in node.children.iter().flatten() {
                assert_eq!(child.level, node.level + 1);
                check_levels(child);
            }
        }
        check_levels(&tree);
    }

    #[test]
    fn every_seed_log_references_a_known_leaf() {
        let tree = default_tree();
        for log in default_logs() {
            let node = tree.find(&log.node_id).expect("seed log must resolve");
            assert!(node.is_leaf());
        }
    }
}
