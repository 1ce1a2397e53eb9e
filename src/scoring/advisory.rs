//! Advisory engine
//!
//! Starts from a wellness score of 100 and applies independent rules to the
//! observed readings. Each rule may deduct points and emit tips with stable
//! ids so a checklist can track them across runs.

use std::cmp::Reverse;

use crate::normalizer::Normalizer;
use crate::schema::{VitalValue, VitalsRecord};
use crate::types::{
    AdvisoryResult, ObservedVitals, Priority, Tip, WellnessIssue, WellnessStatus,
};

/// Engine producing the deduction/tip view
pub struct AdvisoryEngine;

impl AdvisoryEngine {
    /// Observe a raw record and evaluate it
    pub fn advise(record: &VitalsRecord) -> AdvisoryResult {
        let bp_text = record.bp.as_ref().and_then(bp_reading_text);
        Self::run(&Normalizer::observe(record), bp_text.as_deref())
    }

    /// Evaluate observed readings. Absent and zero readings trigger no rule.
    pub fn evaluate(vitals: &ObservedVitals) -> AdvisoryResult {
        Self::run(vitals, None)
    }

    fn run(vitals: &ObservedVitals, bp_text: Option<&str>) -> AdvisoryResult {
        let mut advice = Advice::new();

        check_heart_rate(&mut advice, vitals);
        check_sleep(&mut advice, vitals);
        check_steps(&mut advice, vitals);
        check_stress(&mut advice, vitals);
        check_energy(&mut advice, vitals);
        check_blood_pressure(&mut advice, vitals, bp_text);
        check_temperature(&mut advice, vitals);

        advice.finish()
    }
}

/// Accumulator threaded through the rules
struct Advice {
    score: i32,
    tips: Vec<Tip>,
    issues: Vec<WellnessIssue>,
}

impl Advice {
    fn new() -> Self {
        Self {
            score: 100,
            tips: Vec::new(),
            issues: Vec::new(),
        }
    }

    fn deduct(&mut self, points: i32, issue: WellnessIssue) {
        self.score -= points;
        self.issues.push(issue);
    }

    fn tip(&mut self, id: &str, text: impl Into<String>, priority: Priority) {
        self.tips.push(Tip::new(id, text, priority));
    }

    fn finish(self) -> AdvisoryResult {
        let Advice {
            score,
            mut tips,
            issues,
        } = self;

        let score = score.clamp(0, 100);
        let status = WellnessStatus::from_score(score);

        if tips.is_empty() {
            tips.push(Tip::positive(
                "general-tip-1",
                "Your vitals look great! Keep maintaining healthy habits 💪",
            ));
        } else if !tips.iter().any(|tip| tip.positive) && score >= 70 {
            tips.insert(
                0,
                Tip::positive(
                    "general-tip-2",
                    "You're on the right track! Here are some suggestions to optimize further:",
                ),
            );
        }

        // Stable: generation order is kept within a priority.
        tips.sort_by_key(|tip| Reverse(tip.priority.weight()));

        let result = AdvisoryResult {
            score,
            status,
            tips,
            issues,
        };

        if result.requires_escalation() {
            tracing::info!(score, status = %status, "advisory score below escalation threshold");
        }

        result
    }
}

fn reading(value: Option<f64>) -> Option<f64> {
    value.filter(|n| *n != 0.0)
}

fn check_heart_rate(advice: &mut Advice, vitals: &ObservedVitals) {
    let Some(heart_rate) = reading(vitals.heart_rate) else {
        return;
    };

    if heart_rate > 95.0 {
        advice.deduct(10, WellnessIssue::HighHeartRate);
        advice.tip(
            "hr-tip-1",
            "Practice deep breathing exercises (4-7-8 technique) for 5 minutes to lower heart rate",
            Priority::High,
        );
        advice.tip(
            "hr-tip-2",
            "Avoid caffeine and try a calming herbal tea",
            Priority::Medium,
        );
    } else if heart_rate < 60.0 {
        advice.issues.push(WellnessIssue::LowHeartRate);
        advice.tip(
            "hr-tip-3",
            "Light physical activity may help - consider a gentle walk",
            Priority::Low,
        );
    }
}

fn check_sleep(advice: &mut Advice, vitals: &ObservedVitals) {
    let Some(hours) = reading(vitals.sleep_hours) else {
        return;
    };

    if hours < 6.0 {
        advice.deduct(15, WellnessIssue::InsufficientSleep);
        advice.tip(
            "sleep-tip-1",
            format!(
                "Aim for 7-9 hours of sleep. You got {} hours - try going to bed 1-2 hours earlier tonight",
                display_number(hours)
            ),
            Priority::High,
        );
        advice.tip(
            "sleep-tip-2",
            "Create a bedtime routine: dim lights, avoid screens 1 hour before sleep",
            Priority::Medium,
        );
        advice.tip(
            "sleep-tip-3",
            "Try relaxation techniques like meditation or listening to calming music",
            Priority::Medium,
        );
    } else if hours >= 7.0 {
        advice.tips.push(Tip::positive(
            "sleep-tip-4",
            format!(
                "Great sleep! You got {} hours. Keep this routine going! 🌙",
                display_number(hours)
            ),
        ));
    }
}

fn check_steps(advice: &mut Advice, vitals: &ObservedVitals) {
    let Some(steps) = reading(vitals.steps) else {
        return;
    };

    if steps < 4000.0 {
        advice.deduct(10, WellnessIssue::LowActivity);
        advice.tip(
            "steps-tip-1",
            format!(
                "You've taken {} steps today. Aim for 10,000 steps - try a 20-minute walk",
                display_number(steps)
            ),
            Priority::Medium,
        );
        advice.tip(
            "steps-tip-2",
            "Break up sedentary time - take 5-minute walking breaks every hour",
            Priority::Low,
        );
    } else if steps >= 10000.0 {
        advice.tips.push(Tip::positive(
            "steps-tip-3",
            format!(
                "Excellent! {} steps today! 🏃 Keep it up!",
                format_thousands(steps)
            ),
        ));
    }
}

fn check_stress(advice: &mut Advice, vitals: &ObservedVitals) {
    let Some(stress) = reading(vitals.stress) else {
        return;
    };

    if stress > 70.0 {
        advice.deduct(20, WellnessIssue::HighStress);
        advice.tip(
            "stress-tip-1",
            format!(
                "Stress level is {}% - try progressive muscle relaxation or guided meditation",
                display_number(stress)
            ),
            Priority::High,
        );
        advice.tip(
            "stress-tip-2",
            "Take a 10-minute break - step away from stressors and practice mindfulness",
            Priority::High,
        );
        advice.tip(
            "stress-tip-3",
            "Listen to calming music or nature sounds to help reduce stress",
            Priority::Medium,
        );
    } else if stress < 40.0 {
        advice.tips.push(Tip::positive(
            "stress-tip-4",
            format!(
                "Great stress management! Your stress level is {}% - well controlled! 😌",
                display_number(stress)
            ),
        ));
    }
}

fn check_energy(advice: &mut Advice, vitals: &ObservedVitals) {
    let Some(energy) = reading(vitals.energy) else {
        return;
    };

    if energy < 50.0 {
        advice.deduct(10, WellnessIssue::LowEnergy);
        advice.tip(
            "energy-tip-1",
            format!(
                "Energy level at {}% - ensure you're eating balanced meals and staying hydrated",
                display_number(energy)
            ),
            Priority::High,
        );
        advice.tip(
            "energy-tip-2",
            "Try a short 10-minute walk or light stretching to boost energy naturally",
            Priority::Medium,
        );
        advice.tip(
            "energy-tip-3",
            "Consider checking your sleep quality - poor sleep drains energy",
            Priority::Medium,
        );
    }
}

fn check_blood_pressure(advice: &mut Advice, vitals: &ObservedVitals, bp_text: Option<&str>) {
    let Some(bp) = vitals.bp else {
        return;
    };

    if bp.systolic >= 140 || bp.diastolic >= 90 {
        advice.deduct(15, WellnessIssue::HighBp);
        advice.tip(
            "bp-tip-1",
            format!(
                "Blood pressure is elevated ({}). Practice deep breathing and consider consulting a healthcare provider",
                bp_text.map_or_else(|| format!("{}/{}", bp.systolic, bp.diastolic), str::to_string)
            ),
            Priority::High,
        );
        advice.tip(
            "bp-tip-2",
            "Reduce sodium intake and increase potassium-rich foods (bananas, leafy greens)",
            Priority::Medium,
        );
    }
}

fn check_temperature(advice: &mut Advice, vitals: &ObservedVitals) {
    let Some(temperature) = reading(vitals.temperature) else {
        return;
    };

    if temperature > 37.5 {
        advice.issues.push(WellnessIssue::ElevatedTemp);
        advice.tip(
            "temp-tip-1",
            format!(
                "Temperature is {}°C - rest and stay hydrated. Monitor for other symptoms",
                display_temperature(temperature)
            ),
            Priority::Medium,
        );
    }
}

/// Reading as entered; whole numbers print without a fraction
fn display_number(n: f64) -> String {
    format!("{}", n)
}

/// Converted Fahrenheit carries float noise, so one decimal place at most
fn display_temperature(celsius: f64) -> String {
    format!("{}", (celsius * 10.0).round() / 10.0)
}

/// Blood pressure as the user wrote it
fn bp_reading_text(value: &VitalValue) -> Option<String> {
    match value {
        VitalValue::Numeric(n) => Some(format!("{}", n)),
        VitalValue::Percentage(n) => Some(format!("{}%", n)),
        VitalValue::Label(_) => None,
        VitalValue::Raw(text) => Some(text.trim().to_string()),
    }
}

fn format_thousands(n: f64) -> String {
    let whole = n.trunc().abs() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if n < 0.0 {
        grouped.insert(0, '-');
    }
    grouped
}
