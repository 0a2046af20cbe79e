//! Configuration handed to the calendar widget.

use serde_json::{Value, json};

/// Week view starting Monday, hourly slots, quarter-hour snapping, 24h labels.
pub fn calendar_options() -> Value {
    let hour_minute = json!({ "hour": "2-digit", "minute": "2-digit", "hour12": false });

    json!({
        "initialView": "timeGridWeek",
        "locale": "en-gb",
        "firstDay": 1,
        "slotMinTime": "00:00:00",
        "slotMaxTime": "24:00:00",
        "slotDuration": "01:00:00",
        "snapDuration": "00:15:00",
        "allDaySlot": false,
        "nowIndicator": true,
        "height": "auto",
        "expandRows": false,
        "editable": true,
        "eventResizableFromStart": true,
        "headerToolbar": {
            "left": "prev,next today",
            "center": "title",
            "right": "timeGridDay,timeGridWeek,dayGridMonth,listWeek"
        },
        "slotLabelFormat": hour_minute.clone(),
        "eventTimeFormat": hour_minute,
    })
}
