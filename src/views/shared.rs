use yew::prelude::*;

use crate::models::{format_amount, Transaction};

pub fn page_shell(title: &'static str, actions: Html, children: Html) -> Html {
    html! {
        <div class="p-6 max-w-5xl mx-auto">
            <div class="flex items-center justify-between pb-4 border-b border-border">
                <h1 class="text-2xl font-bold text-foreground">{ title }</h1>
                { actions }
            </div>
            <div class="pt-5 space-y-6">
                { children }
            </div>
        </div>
    }
}

pub fn empty_state(message: &'static str) -> Html {
    html! { <small class="text-muted-foreground">{ message }</small> }
}

pub fn error_text(message: &Option<String>) -> Html {
    match message {
        Some(msg) => html! { <p class="text-sm text-red-500">{ msg.clone() }</p> },
        None => html! {},
    }
}

pub fn transaction_meta(tx: &Transaction) -> String {
    [
        tx.cliente.as_deref(),
        tx.oficina.as_deref(),
        tx.fecha.as_deref(),
    ]
    .iter()
    .flatten()
    .filter(|s| !s.is_empty())
    .cloned()
    .collect::<Vec<_>>()
    .join(" • ")
}

pub fn transaction_line(tx: &Transaction) -> Html {
    html! {
        <div class="op-item py-3 border-b border-border">
            <div class="flex items-center justify-between">
                <b class="text-foreground">{ &tx.tipo }</b>
                <span class="font-semibold text-[#1D617A]">{ format_amount(tx.importe, &tx.moneda) }</span>
            </div>
            <div class="op-meta text-xs text-muted-foreground mt-1">{ transaction_meta(tx) }</div>
        </div>
    }
}

pub fn transaction_list(items: &[Transaction], empty: &'static str) -> Html {
    if items.is_empty() {
        return empty_state(empty);
    }
    html! {
        <div class="bg-card rounded-[10px] border border-border px-6">
            { for items.iter().map(transaction_line) }
        </div>
    }
}
