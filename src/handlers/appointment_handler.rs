use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::errors::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::appointment::{CreateAppointmentRequest, UpdateAppointmentRequest};
use crate::services::AppointmentService;

pub async fn list_doctors(
    appointments: web::Data<AppointmentService>,
) -> Result<HttpResponse, AppError> {
    let doctors = appointments.list_doctors().await?;
    Ok(HttpResponse::Ok().json(doctors))
}

pub async fn get_doctor(
    appointments: web::Data<AppointmentService>,
    doctor_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let doctor = appointments.get_doctor(&doctor_id).await?;
    Ok(HttpResponse::Ok().json(doctor))
}

#[tracing::instrument(
    name = "List appointments",
    skip(appointments, user),
    fields(username = %user.username)
)]
pub async fn list_appointments(
    appointments: web::Data<AppointmentService>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    let booked = appointments.list_for_owner(user.user_id).await?;
    Ok(HttpResponse::Ok().json(booked))
}

#[tracing::instrument(
    name = "Book appointment",
    skip(appointments, user, request),
    fields(username = %user.username)
)]
pub async fn book_appointment(
    appointments: web::Data<AppointmentService>,
    user: web::ReqData<AuthenticatedUser>,
    request: web::Json<CreateAppointmentRequest>,
) -> Result<HttpResponse, AppError> {
    let appointment = appointments
        .book(user.user_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Appointment booked successfully",
        "appointment": appointment,
    })))
}

#[tracing::instrument(
    name = "Update appointment",
    skip(appointments, user, request),
    fields(username = %user.username)
)]
pub async fn update_appointment(
    appointments: web::Data<AppointmentService>,
    user: web::ReqData<AuthenticatedUser>,
    appointment_id: web::Path<String>,
    request: web::Json<UpdateAppointmentRequest>,
) -> Result<HttpResponse, AppError> {
    let appointment = appointments
        .update(user.user_id, &appointment_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Appointment updated successfully",
        "appointment": appointment,
    })))
}

#[tracing::instrument(
    name = "Cancel appointment",
    skip(appointments, user),
    fields(username = %user.username)
)]
pub async fn delete_appointment(
    appointments: web::Data<AppointmentService>,
    user: web::ReqData<AuthenticatedUser>,
    appointment_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    appointments.cancel(user.user_id, &appointment_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Appointment cancelled successfully"
    })))
}
