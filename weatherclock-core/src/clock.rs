use chrono::{Datelike, Timelike};

/// Time and date lines of the clock face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockFace {
    pub time: String,
    pub date: String,
}

impl ClockFace {
    pub fn at<T: Datelike + Timelike>(now: &T) -> Self {
        Self {
            time: format!("{:02}:{:02}", now.hour(), now.minute()),
            date: format!("{:02}/{:02} {}", now.month(), now.day(), weekday_name(now.weekday())),
        }
    }
}

fn weekday_name(day: chrono::Weekday) -> &'static str {
    use chrono::Weekday::*;
    match day {
        Mon => "Monday",
        Tue => "Tuesday",
        Wed => "Wednesday",
        Thu => "Thursday",
        Fri => "Friday",
        Sat => "Saturday",
        Sun => "Sunday",
    }
}
