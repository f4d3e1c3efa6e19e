use actix_web::{delete, get, patch, post, web, HttpResponse};

use crate::errors::AppError;
use crate::handlers::appointment_handler::{
    book_appointment, delete_appointment, get_doctor, list_appointments, list_doctors,
    update_appointment,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::appointment::{CreateAppointmentRequest, UpdateAppointmentRequest};
use crate::services::AppointmentService;

#[get("/doctors")]
async fn doctors(
    appointments: web::Data<AppointmentService>,
) -> Result<HttpResponse, AppError> {
    list_doctors(appointments).await
}

#[get("/doctors/{id}")]
async fn doctor(
    appointments: web::Data<AppointmentService>,
    doctor_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    get_doctor(appointments, doctor_id).await
}

#[get("/appointments")]
async fn my_appointments(
    appointments: web::Data<AppointmentService>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    list_appointments(appointments, user).await
}

#[post("/appointments")]
async fn book(
    appointments: web::Data<AppointmentService>,
    user: web::ReqData<AuthenticatedUser>,
    request: web::Json<CreateAppointmentRequest>,
) -> Result<HttpResponse, AppError> {
    book_appointment(appointments, user, request).await
}

#[patch("/appointments/{id}")]
async fn update(
    appointments: web::Data<AppointmentService>,
    user: web::ReqData<AuthenticatedUser>,
    appointment_id: web::Path<String>,
    request: web::Json<UpdateAppointmentRequest>,
) -> Result<HttpResponse, AppError> {
    update_appointment(appointments, user, appointment_id, request).await
}

#[delete("/appointments/{id}")]
async fn cancel(
    appointments: web::Data<AppointmentService>,
    user: web::ReqData<AuthenticatedUser>,
    appointment_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    delete_appointment(appointments, user, appointment_id).await
}
