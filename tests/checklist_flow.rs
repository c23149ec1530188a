//! Flujo completo de la aplicación: registro, aprobación y panel,
//! contra un almacenamiento local real en un directorio temporal.

use uuid::Uuid;

use fleet_checklist::config::environment::EnvironmentConfig;
use fleet_checklist::models::checklist::{ChecklistDraft, ChecklistType, ItemStatus, Signature};
use fleet_checklist::models::user::{CreateUserRequest, ReviewRole, User, UserRole};
use fleet_checklist::models::vehicle::{CreateVehicleRequest, Vehicle};
use fleet_checklist::services::dashboard_service::{history_view, open_vehicles, HistoryFilters};
use fleet_checklist::state::AppState;
use fleet_checklist::utils::errors::AppError;

fn test_config() -> EnvironmentConfig {
    EnvironmentConfig {
        data_dir: std::env::temp_dir()
            .join("fleet_checklist_flow")
            .join(Uuid::new_v4().to_string()),
        supabase_url: None,
        supabase_anon_key: None,
    }
}

fn setup() -> (AppState, User, Vehicle, User) {
    let mut state = AppState::load(&test_config()).unwrap();
    let admin = state.login("admin", "").unwrap();

    let vehicle = state
        .add_vehicle(CreateVehicleRequest {
            prefix: "SOL-01".to_string(),
            plate: "ABC1D23".to_string(),
            current_km: 50_000,
            current_horimetro: 1_200,
        })
        .unwrap();

    let operador = state
        .add_user(CreateUserRequest {
            name: "João da Silva".to_string(),
            username: "joao".to_string(),
            role: UserRole::Operador,
            matricula: Some("4411".to_string()),
        })
        .unwrap();

    (state, admin, vehicle, operador)
}

fn valid_draft(state: &AppState, operador: &User, vehicle: &Vehicle) -> ChecklistDraft {
    let mut draft = ChecklistDraft::new(operador, &state.criteria);
    draft.vehicle_id = Some(vehicle.id);
    draft.driver_name = operador.name.clone();
    draft.km = Some(vehicle.current_km + 35);
    draft.horimetro = Some(vehicle.current_horimetro + 3);
    for item in state.criteria.clone() {
        draft.score_item(item.id, ItemStatus::Ok);
    }
    draft.signature = Some(Signature::from_text(&operador.name));
    draft
}

fn reviewer(state: &mut AppState, username: &str, role: UserRole) -> User {
    state
        .add_user(CreateUserRequest {
            name: format!("Revisor {}", username),
            username: username.to_string(),
            role,
            matricula: None,
        })
        .unwrap()
}

#[tokio::test]
async fn test_stale_km_reading_blocks_submission() {
    let (mut state, _admin, vehicle, operador) = setup();

    let mut draft = valid_draft(&state, &operador, &vehicle);
    draft.km = Some(49_000);

    match state.submit_draft(draft) {
        Err(AppError::Draft(issues)) => {
            assert!(issues
                .iter()
                .any(|issue| issue.to_string() == "KM não pode ser inferior a 50000."));
        }
        other => panic!("expected rejection, got {:?}", other.map(|e| e.id)),
    }
    assert!(state.entries.is_empty());
}

#[tokio::test]
async fn test_defective_item_routes_entry_through_both_review_queues() {
    let (mut state, admin, vehicle, operador) = setup();
    let manutencao = reviewer(&mut state, "carlos", UserRole::Manutencao);
    let operacao = reviewer(&mut state, "paula", UserRole::Operacao);

    let mut draft = valid_draft(&state, &operador, &vehicle);
    draft.score_item(state.criteria[0].id, ItemStatus::Defeituoso);
    let entry = state.submit_draft(draft).unwrap();

    assert!(entry.has_issues);
    assert!(entry.maintenance_approval.is_none());
    assert!(entry.operation_approval.is_none());

    // El entry pendiente encabeza las dos colas de revisión
    let view = history_view(&state.entries, &manutencao, &HistoryFilters::default());
    assert_eq!(view[0].id, entry.id);
    let view = history_view(&state.entries, &operacao, &HistoryFilters::default());
    assert_eq!(view[0].id, entry.id);

    // La firma de manutención saca el entry de su cola, no de la otra
    assert!(state
        .approve_entry(entry.id, ReviewRole::Manutencao, &manutencao)
        .unwrap());
    let approved = state.entry_by_id(entry.id).unwrap().clone();
    let approval = approved.maintenance_approval.as_ref().unwrap();
    assert_eq!(approval.user_id, manutencao.id);
    assert_eq!(approval.user_name, manutencao.name);
    assert!(approved.operation_approval.is_none());

    // Segunda firma sobre la misma cola: gana la primera
    assert!(!state
        .approve_entry(entry.id, ReviewRole::Manutencao, &admin)
        .unwrap());
    assert_eq!(
        state
            .entry_by_id(entry.id)
            .unwrap()
            .maintenance_approval
            .as_ref()
            .unwrap()
            .user_id,
        manutencao.id
    );
}

#[tokio::test]
async fn test_departure_then_return_closes_the_vehicle() {
    let (mut state, _admin, vehicle, operador) = setup();

    let mut saida = valid_draft(&state, &operador, &vehicle);
    saida.checklist_type = ChecklistType::Saida;
    state.submit_draft(saida).unwrap();

    let open = open_vehicles(&state.entries);
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].prefix, "SOL-01");

    let vehicle = state.vehicle_by_id(vehicle.id).unwrap().clone();
    let mut retorno = valid_draft(&state, &operador, &vehicle);
    retorno.checklist_type = ChecklistType::Retorno;
    retorno.km = Some(vehicle.current_km + 80);
    retorno.horimetro = Some(vehicle.current_horimetro + 6);
    state.submit_draft(retorno).unwrap();

    assert!(open_vehicles(&state.entries).is_empty());
}

#[tokio::test]
async fn test_operador_login_and_scoped_history() {
    let (mut state, _admin, vehicle, operador) = setup();

    let draft = valid_draft(&state, &operador, &vehicle);
    state.submit_draft(draft).unwrap();

    // La matrícula es la credencial del operador
    state.logout().unwrap();
    assert!(state.login("joao", "0000").is_err());
    let logged = state.login("João da Silva", "4411").unwrap();
    assert_eq!(logged.id, operador.id);

    // Y su historial queda acotado a lo propio
    let view = history_view(&state.entries, &logged, &HistoryFilters::default());
    assert!(view.iter().all(|entry| entry.user_id == operador.id));
    assert_eq!(view.len(), 1);
}

#[tokio::test]
async fn test_projections_are_referentially_transparent() {
    let (mut state, admin, vehicle, operador) = setup();

    let mut draft = valid_draft(&state, &operador, &vehicle);
    draft.score_item(state.criteria[0].id, ItemStatus::Falta);
    state.submit_draft(draft).unwrap();

    let vehicle = state.vehicle_by_id(vehicle.id).unwrap().clone();
    let draft = valid_draft(&state, &operador, &vehicle);
    state.submit_draft(draft).unwrap();

    let filters = HistoryFilters::default();
    let first: Vec<Uuid> = history_view(&state.entries, &admin, &filters)
        .iter()
        .map(|e| e.id)
        .collect();
    let second: Vec<Uuid> = history_view(&state.entries, &admin, &filters)
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(first, second);

    let open_first: Vec<Uuid> = open_vehicles(&state.entries).iter().map(|e| e.id).collect();
    let open_second: Vec<Uuid> = open_vehicles(&state.entries).iter().map(|e| e.id).collect();
    assert_eq!(open_first, open_second);
}

#[tokio::test]
async fn test_everything_survives_a_reload_from_disk() {
    let config = test_config();
    let entry_id;
    {
        let mut state = AppState::load(&config).unwrap();
        state.login("admin", "").unwrap();
        let vehicle = state
            .add_vehicle(CreateVehicleRequest {
                prefix: "SOL-09".to_string(),
                plate: "XYZ9A88".to_string(),
                current_km: 10,
                current_horimetro: 1,
            })
            .unwrap();
        let admin = state.current_user().unwrap().clone();
        let mut draft = valid_draft(&state, &admin, &vehicle);
        draft.score_item(state.criteria[0].id, ItemStatus::Defeituoso);
        entry_id = state.submit_draft(draft).unwrap().id;
        state
            .approve_entry(entry_id, ReviewRole::Operacao, &admin)
            .unwrap();
    }

    let state = AppState::load(&config).unwrap();
    let entry = state.entry_by_id(entry_id).unwrap();
    assert!(entry.has_issues);
    assert!(entry.operation_approval.is_some());
    assert!(entry.maintenance_approval.is_none());
    assert_eq!(state.current_user().unwrap().username, "admin");
}
