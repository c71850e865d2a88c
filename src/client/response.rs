use serde::Deserialize;

/// `{"value": ...}` envelope around single objects.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseWrapper<T> {
    pub value: Option<T>,
}

/// `{"values": [...]}` envelope returned by search endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default)]
    pub full_result_size: Option<i64>,
    #[serde(default)]
    pub from: Option<i64>,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
}

/// Identity behind the current session token.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub employee_id: Option<i64>,
    pub actual_employee_id: Option<i64>,
    pub company_id: Option<i64>,
    pub language: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_without_values_is_empty() {
        let list: ListResponse<WhoAmI> = serde_json::from_value(json!({"fullResultSize": 0})).unwrap();
        assert!(list.values.is_empty());
        assert_eq!(list.full_result_size, Some(0));
    }

    #[test]
    fn who_am_i_ignores_unknown_fields() {
        let wrapped: ResponseWrapper<WhoAmI> = serde_json::from_value(json!({
            "value": {"employeeId": 1, "actualEmployeeId": 2, "companyId": 3, "language": "NO", "employee": {"id": 1}}
        }))
        .unwrap();
        let who = wrapped.value.unwrap();
        assert_eq!(who.actual_employee_id, Some(2));
        assert_eq!(who.language.as_deref(), Some("NO"));
    }
}
