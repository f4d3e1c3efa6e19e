use serde::Serialize;

use crate::models::health_record::{MetricValue, RecordKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricStatus {
    Low,
    Normal,
    High,
    Elevated,
    Excellent,
    Good,
    Fair,
    Poor,
    Unknown,
}

pub fn classify_heart_rate(bpm: f64) -> MetricStatus {
    if bpm < 60.0 {
        MetricStatus::Low
    } else if bpm <= 100.0 {
        MetricStatus::Normal
    } else {
        MetricStatus::High
    }
}

pub fn classify_blood_pressure(systolic: f64, diastolic: f64) -> MetricStatus {
    if systolic < 120.0 && diastolic < 80.0 {
        MetricStatus::Normal
    } else {
        MetricStatus::Elevated
    }
}

pub fn classify_blood_oxygen(percent: f64) -> MetricStatus {
    if percent >= 98.0 {
        MetricStatus::Excellent
    } else if percent >= 95.0 {
        MetricStatus::Normal
    } else {
        MetricStatus::Low
    }
}

pub fn classify_sleep_quality(percent: f64) -> MetricStatus {
    if percent >= 75.0 {
        MetricStatus::Good
    } else if percent >= 50.0 {
        MetricStatus::Fair
    } else {
        MetricStatus::Poor
    }
}

/// Status band for a parsed reading. Values that do not fit the kind's
/// shape classify as `Unknown`.
pub fn classify(kind: &RecordKind, value: &MetricValue) -> MetricStatus {
    match (kind, value) {
        (RecordKind::HeartRate, MetricValue::Scalar(v)) => classify_heart_rate(*v),
        (RecordKind::SleepQuality, MetricValue::Scalar(v)) => classify_sleep_quality(*v),
        (RecordKind::BloodOxygen, MetricValue::Scalar(v)) => classify_blood_oxygen(*v),
        (RecordKind::BloodPressure, MetricValue::BloodPressure { systolic, diastolic }) => {
            classify_blood_pressure(*systolic, *diastolic)
        }
        _ => MetricStatus::Unknown,
    }
}

pub fn recommendation(kind: &RecordKind, status: MetricStatus) -> &'static str {
    match (kind, status) {
        (RecordKind::HeartRate, MetricStatus::Normal) => "Your heart rate is within the normal range.",
        (RecordKind::HeartRate, MetricStatus::Low) => {
            "Your resting heart rate is below 60 BPM. If you feel dizzy or tired, consult your physician."
        }
        (RecordKind::HeartRate, MetricStatus::High) => {
            "Your heart rate is above 100 BPM. Rest, stay hydrated and consult your physician if it persists."
        }
        (RecordKind::BloodPressure, MetricStatus::Normal) => "Your blood pressure is within the normal range.",
        (RecordKind::BloodPressure, MetricStatus::Elevated) => {
            "Consider consulting your physician about blood-pressure management."
        }
        (RecordKind::BloodOxygen, MetricStatus::Excellent) => "Your blood oxygen level is excellent.",
        (RecordKind::BloodOxygen, MetricStatus::Normal) => "Your blood oxygen is within the normal range.",
        (RecordKind::BloodOxygen, MetricStatus::Low) => {
            "Your blood oxygen is below 95%. Seek medical advice, especially if you feel short of breath."
        }
        (RecordKind::SleepQuality, MetricStatus::Good) => "Your sleep quality is good. Keep a consistent schedule.",
        (RecordKind::SleepQuality, MetricStatus::Fair) => {
            "Your sleep quality is fair. Limit screens and caffeine before bed."
        }
        (RecordKind::SleepQuality, MetricStatus::Poor) => {
            "Your sleep quality is poor. Consider discussing sleep hygiene with your physician."
        }
        _ => "Not enough valid readings to give a recommendation.",
    }
}

/// Arithmetic mean of the readings that match the kind's shape.
pub fn average(values: &[MetricValue]) -> Option<MetricValue> {
    let mut scalars = Vec::new();
    let mut pressures = Vec::new();
    for value in values {
        match value {
            MetricValue::Scalar(v) => scalars.push(*v),
            MetricValue::BloodPressure { systolic, diastolic } => pressures.push((*systolic, *diastolic)),
            MetricValue::Text(_) => {}
        }
    }

    if !pressures.is_empty() {
        let n = pressures.len() as f64;
        let (sys, dia) = pressures
            .iter()
            .fold((0.0, 0.0), |(s, d), (sys, dia)| (s + sys, d + dia));
        return Some(MetricValue::BloodPressure { systolic: sys / n, diastolic: dia / n });
    }
    if !scalars.is_empty() {
        return Some(MetricValue::Scalar(scalars.iter().sum::<f64>() / scalars.len() as f64));
    }
    None
}

/// Overall score out of 100 from metric averages. Missing metrics do not
/// cost points.
pub fn health_score(
    heart_rate: Option<f64>,
    blood_pressure: Option<(f64, f64)>,
    blood_oxygen: Option<f64>,
) -> u8 {
    let mut score: i32 = 100;

    if let Some(bpm) = heart_rate {
        if !(60.0..=100.0).contains(&bpm) {
            score -= 10;
        }
    }
    if let Some((systolic, diastolic)) = blood_pressure {
        if systolic > 130.0 || diastolic > 80.0 {
            score -= 15;
        }
    }
    if let Some(percent) = blood_oxygen {
        if percent < 95.0 {
            score -= 20;
        }
    }

    score.max(0) as u8
}
