use std::env;

pub fn insta_snapshot<F: FnOnce()>(f: F) {
    let mut settings = insta::Settings::clone_current();
    let snapshot_path = env::current_dir().unwrap().join("./test/snapshots");
    settings.set_snapshot_path(snapshot_path);
    settings.bind(f);
}

pub fn progress_frame_fixture() -> &'static str {
    return r#"{
  "type": "progress",
  "data": {
    "message_id": "msg-1",
    "message": "Resolving fund universe"
  }
}"#;
}

pub fn waiting_filters_frame_fixture() -> &'static str {
    return r#"{
  "type": "progress",
  "data": {
    "message_id": "msg-1",
    "step": "waiting_filters",
    "filters": [
      {
        "column": "fund_name",
        "name": "fund",
        "table": "funds",
        "type": "enum",
        "is_required": true,
        "enum_values": ["Fund I", "Fund II"]
      },
      {
        "column": "as_of_date",
        "name": "as_of",
        "table": "positions",
        "type": "date",
        "is_required": false,
        "format": "date"
      }
    ]
  }
}"#;
}

pub fn query_completed_data_frame_fixture() -> &'static str {
    return r#"{
  "type": "query_completed",
  "data": {
    "message_id": "msg-1",
    "message": "Fund II returned 12.3% net IRR."
  }
}"#;
}

pub fn query_completed_result_frame_fixture() -> &'static str {
    return r#"{
  "type": "query_completed",
  "result": {
    "message_id": "msg-1",
    "message": "Fund II returned 12.3% net IRR.",
    "raw_result": {"rows": [{"fund": "Fund II", "net_irr": 0.123}]},
    "is_warehouse_query": true
  }
}"#;
}

pub fn connected_frame_fixture() -> &'static str {
    return r#"{
  "type": "connected",
  "sessions_data": {
    "success": true,
    "user_id": "user-7",
    "connection_id": "conn-1",
    "session_count": 2,
    "sorted_by": "updated_at",
    "sort_order": "desc",
    "sessions": [
      {
        "session_id": "sess-a",
        "title": "Fund II performance",
        "created_at": "2024-02-01T09:00:00Z",
        "updated_at": "2024-02-01T09:05:00Z",
        "is_active": false,
        "metadata": {
          "query_type": "assistant_query",
          "session_id": "sess-a",
          "workflow_type": "default"
        }
      },
      {
        "session_id": "sess-b",
        "title": "Asset coverage",
        "created_at": "2024-02-02T10:00:00Z",
        "updated_at": "2024-02-02T10:01:00Z",
        "is_active": true,
        "metadata": {
          "query_type": "assistant_query",
          "session_id": "sess-b",
          "workflow_type": "default"
        }
      }
    ]
  }
}"#;
}

pub fn title_generated_frame_fixture() -> &'static str {
    return r#"{
  "type": "progress",
  "update_type": "title_generated",
  "timestamp": "2024-02-03T12:00:00Z",
  "data": {
    "message_id": "msg-1",
    "session_id": "sess-c",
    "title": "Portfolio concentration"
  }
}"#;
}

pub fn detailed_formatting_frame_fixture() -> &'static str {
    return r#"{
  "type": "progress",
  "update_type": "detailed_formatting_complete",
  "data": {
    "message_id": "msg-1",
    "detailed_formatted_result": "| fund | irr |\n| Fund II | 12.3% |",
    "detailed_raw_result": {"rows": [{"fund": "Fund II"}]},
    "chart_suggestions": {"bar": {"x_axis": "fund", "y_axes": ["irr"]}}
  }
}"#;
}

pub fn chat_history_frame_fixture() -> &'static str {
    return r#"{
  "type": "chat_history_response",
  "history_data": {
    "success": true,
    "session_id": "sess-a",
    "message_count": 4,
    "messages": [
      {
        "message_id": "hist-tool-1",
        "role": "assistant",
        "content": "Fund II returned 12.3% net IRR.",
        "timestamp": "2024-02-01T09:04:00Z",
        "message_order": 3,
        "raw_data": "{\"rows\": [{\"fund\": \"Fund II\"}]}",
        "formatted_data": "{\"columns\": [\"fund\"]}",
        "chart_suggestions": "{\"bar\": {\"x_axis\": \"fund\"}}"
      },
      {
        "message_id": "hist-user-1",
        "role": "user",
        "content": "How did Fund II perform?",
        "timestamp": "2024-02-01T09:00:00Z",
        "message_order": 1,
        "metadata": {"message_id": "hist-user-1"}
      },
      {
        "message_id": "hist-system-1",
        "role": "system",
        "content": "Resolving fund universe",
        "timestamp": "2024-02-01T09:01:00Z",
        "message_order": 2,
        "metadata": {
          "workflow_data": {"message_id": "hist-tool-1"}
        }
      },
      {
        "message_id": "hist-user-2",
        "role": "user",
        "content": "Thanks",
        "timestamp": "2024-02-01T09:05:00Z",
        "message_order": 4,
        "metadata": {"message_id": "hist-user-2"}
      }
    ]
  }
}"#;
}
